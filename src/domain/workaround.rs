//! Toolchain-defect workarounds
//!
//! Each quirk of the pinned XSDK-era toolchain is modeled as a named,
//! independently toggleable pre-step instead of an inline unconditional
//! command, so it can be switched off once the upstream defect is fixed
//! without restructuring the pipeline. All of them default to enabled.

/// A named workaround for a known toolchain defect
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workaround {
    /// Replace the XSDK xsdb.tcl with a patched copy; the shipped version
    /// times out on the first make-project of a fresh workspace
    PatchedXsdbScript,
    /// Copy terminfo entries into the container; the toolchain's interactive
    /// helper crashes on missing terminfo
    TerminfoCopy,
    /// Start a virtual display before synthesis; gtk_init aborts the process
    /// when no display is available
    VirtualDisplay,
    /// Force pseudo-terminal allocation (`ssh -t -t`); rlwrap dies with
    /// SIGFPE without a controlling terminal
    ForcePty,
    /// Wrap the synthesis invocation in `screen`; when stdin is /dev/null
    /// even forced pty allocation is not enough
    ScreenWrapper,
}

impl Workaround {
    pub const ALL: [Workaround; 5] = [
        Workaround::PatchedXsdbScript,
        Workaround::TerminfoCopy,
        Workaround::VirtualDisplay,
        Workaround::ForcePty,
        Workaround::ScreenWrapper,
    ];

    /// CLI flag value for `--disable`
    pub fn flag_name(&self) -> &'static str {
        match self {
            Workaround::PatchedXsdbScript => "xsdb-patch",
            Workaround::TerminfoCopy => "terminfo",
            Workaround::VirtualDisplay => "vnc",
            Workaround::ForcePty => "pty",
            Workaround::ScreenWrapper => "screen",
        }
    }

    pub fn from_flag(flag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|w| w.flag_name() == flag)
    }
}

/// The set of active workarounds for one run
#[derive(Clone, Debug, Default)]
pub struct WorkaroundSet {
    disabled: Vec<Workaround>,
}

impl WorkaroundSet {
    pub fn enabled(&self, workaround: Workaround) -> bool {
        !self.disabled.contains(&workaround)
    }

    pub fn disable(&mut self, workaround: Workaround) {
        if !self.disabled.contains(&workaround) {
            self.disabled.push(workaround);
        }
    }
}
