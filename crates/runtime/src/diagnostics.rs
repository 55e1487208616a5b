use foundation::ViewerName;
use log::Level;

/// One diagnostic record emitted by a viewer.
///
/// Records are kept in emission order; `seq` is 0-based per log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub seq: u64,
    pub level: Level,
    pub viewer: String,
    pub kind: &'static str,
    pub message: String,
}

/// In-memory diagnostic channel.
///
/// Every record is also forwarded to the `log` facade under the `viewer`
/// target, so hosts that install a logger see the same stream.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    next_seq: u64,
    records: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(
        &mut self,
        level: Level,
        viewer: &ViewerName,
        kind: &'static str,
        message: impl Into<String>,
    ) {
        let message = message.into();
        log::log!(target: "viewer", level, "[{viewer}] {kind}: {message}");
        self.records.push(Diagnostic {
            seq: self.next_seq,
            level,
            viewer: viewer.to_string(),
            kind,
            message,
        });
        self.next_seq = self.next_seq.wrapping_add(1);
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::DiagnosticLog;
    use foundation::ViewerName;
    use log::Level;

    fn cave() -> ViewerName {
        ViewerName::new("cave").unwrap()
    }

    #[test]
    fn records_in_emission_order() {
        let mut log = DiagnosticLog::new();
        log.emit(Level::Info, &cave(), "activate", "first");
        log.emit(Level::Error, &cave(), "load-failed", "second");
        let seqs: Vec<_> = log.records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(log.records()[1].viewer, "cave");
        assert_eq!(log.count_kind("load-failed"), 1);
    }

    #[test]
    fn count_kind_ignores_other_kinds() {
        let mut log = DiagnosticLog::new();
        log.emit(Level::Info, &cave(), "fullscreen", "m");
        log.emit(Level::Debug, &cave(), "fullscreen-unavailable", "m");
        log.emit(Level::Info, &cave(), "fullscreen", "m");
        assert_eq!(log.count_kind("fullscreen"), 2);
        assert_eq!(log.count_kind("render-failed"), 0);
    }
}
