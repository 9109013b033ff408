//! 5'/3' terminus markers at either end of a sequence.

/// Recognised markers, longest first.
pub const MARKERS: [&str; 4] = ["5'", "5ʹ", "3'", "3ʹ"];

/// Markers found at the two ends of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Termini {
    pub leading: Option<&'static str>,
    pub trailing: Option<&'static str>,
}

impl Termini {
    /// Strip at most one leading and one trailing marker from `seq`.
    ///
    /// A string that is only a marker yields that marker as leading and an
    /// empty core.
    pub fn split(seq: &str) -> (Termini, &str) {
        let mut core = seq;
        let mut termini = Termini::default();
        if let Some(marker) = MARKERS.iter().copied().find(|m| core.starts_with(m)) {
            termini.leading = Some(marker);
            core = &core[marker.len()..];
        }
        if let Some(marker) = MARKERS.iter().copied().find(|m| core.ends_with(m)) {
            termini.trailing = Some(marker);
            core = &core[..core.len() - marker.len()];
        }
        (termini, core)
    }

    /// Ends exchanged, labels kept: the same strand printed right to left.
    pub fn swapped(self) -> Termini {
        Termini {
            leading: self.trailing,
            trailing: self.leading,
        }
    }

    /// Ends exchanged and relabelled 5'<->3': the opposite strand, which
    /// again reads from its own 5' end.
    pub fn swapped_relabelled(self) -> Termini {
        Termini {
            leading: self.trailing.map(relabel),
            trailing: self.leading.map(relabel),
        }
    }

    pub fn wrap(&self, core: &str) -> String {
        let mut out = String::with_capacity(core.len() + 4);
        if let Some(m) = self.leading {
            out.push_str(m);
        }
        out.push_str(core);
        if let Some(m) = self.trailing {
            out.push_str(m);
        }
        out
    }
}

fn relabel(marker: &'static str) -> &'static str {
    match marker {
        "5'" => "3'",
        "3'" => "5'",
        "5ʹ" => "3ʹ",
        "3ʹ" => "5ʹ",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_both_ends() {
        let (termini, core) = Termini::split("5'-ATGC-3'");
        assert_eq!(termini.leading, Some("5'"));
        assert_eq!(termini.trailing, Some("3'"));
        assert_eq!(core, "-ATGC-");
    }

    #[test]
    fn marker_only_input_has_empty_core() {
        let (termini, core) = Termini::split("5ʹ");
        assert_eq!(termini.leading, Some("5ʹ"));
        assert_eq!(termini.trailing, None);
        assert_eq!(core, "");
    }

    #[test]
    fn no_markers() {
        let (termini, core) = Termini::split("ATGC");
        assert_eq!(termini, Termini::default());
        assert_eq!(core, "ATGC");
    }

    #[test]
    fn relabelled_swap_keeps_five_prime_first() {
        let (termini, core) = Termini::split("5'-ATGC-3'");
        assert_eq!(termini.swapped_relabelled().wrap(core), "5'-ATGC-3'");
        assert_eq!(termini.swapped().wrap(core), "3'-ATGC-5'");
    }
}
