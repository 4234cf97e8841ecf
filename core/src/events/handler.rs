use super::signal::AnalysisSignal;

/// Consumer of the derived signal stream.
///
/// Handlers are self-contained: every fact they need is carried on the
/// signal itself, so handlers never reach back into the processor or each
/// other while a pass is running.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &AnalysisSignal);

    fn handle_signals(&mut self, signals: &[AnalysisSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}
