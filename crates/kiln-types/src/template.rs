//! Model templates
//!
//! A ModelTemplate describes what is being deployed onto a node: a specific
//! hypervisor or OS target. Variants form a closed tagged set selected by a
//! string discriminator at construction time. Each variant carries static
//! metadata (hidden flag, symbolic name, description, version series) and its
//! own way of printing state transitions; new targets are added as new
//! `TemplateKind` variants without touching the shared contract.
//!
//! A template is immutable after construction except for its current state,
//! which only advances through [`crate::log::AuditLog::append`].

use crate::error::{Result, TypeError};
use serde::{Deserialize, Serialize};

/// Closed set of deployable targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Citrix XenServer 6.0 (boston)
    XenServerBoston,
    /// Citrix XenServer 6.1 (tampa)
    XenServerTampa,
    /// VMware ESXi 5 hypervisor
    VmwareEsxi5,
    /// Ubuntu 12.04 (precise) server
    UbuntuPrecise,
    /// Debian 7 (wheezy) server
    DebianWheezy,
    /// Diagnostic no-op deployment; hidden from discovery listings
    Base,
}

/// Broad family of a template, used for variant-specific rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemplateFamily {
    Hypervisor,
    Os,
    Diagnostic,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::XenServerBoston,
        TemplateKind::XenServerTampa,
        TemplateKind::VmwareEsxi5,
        TemplateKind::UbuntuPrecise,
        TemplateKind::DebianWheezy,
        TemplateKind::Base,
    ];

    /// Dispatch on the construction-time discriminator
    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| TypeError::UnknownTemplateKind(s.to_string()))
    }

    /// Symbolic name, doubles as the discriminator value
    pub fn name(&self) -> &'static str {
        match self {
            TemplateKind::XenServerBoston => "xenserver_boston",
            TemplateKind::XenServerTampa => "xenserver_tampa",
            TemplateKind::VmwareEsxi5 => "vmware_esxi_5",
            TemplateKind::UbuntuPrecise => "ubuntu_precise",
            TemplateKind::DebianWheezy => "debian_wheezy",
            TemplateKind::Base => "base",
        }
    }

    /// Human-facing description
    pub fn description(&self) -> &'static str {
        match self {
            TemplateKind::XenServerBoston => "Citrix XenServer 6.0 (boston) Deployment",
            TemplateKind::XenServerTampa => "Citrix XenServer 6.1 (tampa) Deployment",
            TemplateKind::VmwareEsxi5 => "VMware ESXi 5 Hypervisor Deployment",
            TemplateKind::UbuntuPrecise => "Ubuntu 12.04 (precise) Server Deployment",
            TemplateKind::DebianWheezy => "Debian 7 (wheezy) Server Deployment",
            TemplateKind::Base => "Diagnostic No-Op Deployment",
        }
    }

    /// Version/series tag of the target
    pub fn series(&self) -> &'static str {
        match self {
            TemplateKind::XenServerBoston => "boston",
            TemplateKind::XenServerTampa => "tampa",
            TemplateKind::VmwareEsxi5 => "5",
            TemplateKind::UbuntuPrecise => "precise",
            TemplateKind::DebianWheezy => "wheezy",
            TemplateKind::Base => "none",
        }
    }

    /// Hidden kinds are excluded from discovery listings but stay
    /// individually addressable
    pub fn hidden(&self) -> bool {
        matches!(self, TemplateKind::Base)
    }

    /// All kinds that show up in default discovery listings
    pub fn discoverable() -> Vec<TemplateKind> {
        Self::ALL.iter().copied().filter(|k| !k.hidden()).collect()
    }

    fn family(&self) -> TemplateFamily {
        match self {
            TemplateKind::XenServerBoston
            | TemplateKind::XenServerTampa
            | TemplateKind::VmwareEsxi5 => TemplateFamily::Hypervisor,
            TemplateKind::UbuntuPrecise | TemplateKind::DebianWheezy => TemplateFamily::Os,
            TemplateKind::Base => TemplateFamily::Diagnostic,
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration mapping a template is constructed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Discriminator selecting the variant
    pub kind: String,

    /// Initial lifecycle state; defaults to `init`
    #[serde(default)]
    pub initial_state: Option<String>,
}

/// A deployable model template with its current lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelTemplate {
    kind: TemplateKind,
    current_state: String,
}

impl ModelTemplate {
    pub const INITIAL_STATE: &'static str = "init";

    pub fn new(kind: TemplateKind) -> Self {
        Self {
            kind,
            current_state: Self::INITIAL_STATE.to_string(),
        }
    }

    /// Construct from a configuration mapping, dispatching on the
    /// discriminator field
    pub fn from_config(config: &TemplateConfig) -> Result<Self> {
        let kind = TemplateKind::parse(&config.kind)?;
        let mut template = Self::new(kind);
        if let Some(state) = &config.initial_state {
            template.current_state = state.clone();
        }
        Ok(template)
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    pub fn hidden(&self) -> bool {
        self.kind.hidden()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn description(&self) -> &'static str {
        self.kind.description()
    }

    pub fn series(&self) -> &'static str {
        self.kind.series()
    }

    /// Advance the state. Only the audit log append path calls this; state
    /// never changes without a matching log entry.
    pub(crate) fn set_state(&mut self, state: &str) {
        self.current_state = state.to_string();
    }

    /// Human-readable label for a state transition
    pub fn format_state_transition(&self, old: &str, new: &str) -> String {
        match self.kind.family() {
            TemplateFamily::Hypervisor => format!("{} => {}", old, new),
            TemplateFamily::Os => format!("{} -> {}", old, new),
            TemplateFamily::Diagnostic => format!("{}..{}", old, new),
        }
    }

    /// Human-readable elapsed time, e.g. "3d 2h 14m"
    pub fn format_duration(&self, secs: i64) -> String {
        let secs = secs.max(0);
        let days = secs / 86_400;
        let hours = (secs % 86_400) / 3_600;
        let mins = (secs % 3_600) / 60;
        let rem = secs % 60;

        let mut parts = Vec::new();
        if days > 0 {
            parts.push(format!("{}d", days));
        }
        if hours > 0 {
            parts.push(format!("{}h", hours));
        }
        if mins > 0 {
            parts.push(format!("{}m", mins));
        }
        if rem > 0 || parts.is_empty() {
            parts.push(format!("{}s", rem));
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_on_discriminator() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::parse(kind.name()).unwrap(), kind);
        }
        assert!(matches!(
            TemplateKind::parse("solaris_10"),
            Err(TypeError::UnknownTemplateKind(_))
        ));
    }

    #[test]
    fn test_hidden_excluded_from_discovery() {
        let discoverable = TemplateKind::discoverable();
        assert!(!discoverable.contains(&TemplateKind::Base));
        assert_eq!(discoverable.len(), TemplateKind::ALL.len() - 1);
        // Hidden kinds remain constructible
        let template = ModelTemplate::from_config(&TemplateConfig {
            kind: "base".to_string(),
            initial_state: None,
        })
        .unwrap();
        assert!(template.hidden());
    }

    #[test]
    fn test_from_config_initial_state() {
        let template = ModelTemplate::from_config(&TemplateConfig {
            kind: "xenserver_boston".to_string(),
            initial_state: Some("pending".to_string()),
        })
        .unwrap();
        assert_eq!(template.current_state(), "pending");
        assert_eq!(template.series(), "boston");

        let default = ModelTemplate::new(TemplateKind::DebianWheezy);
        assert_eq!(default.current_state(), ModelTemplate::INITIAL_STATE);
    }

    #[test]
    fn test_format_state_transition_per_family() {
        let hv = ModelTemplate::new(TemplateKind::VmwareEsxi5);
        assert_eq!(hv.format_state_transition("pending", "booting"), "pending => booting");

        let os = ModelTemplate::new(TemplateKind::UbuntuPrecise);
        assert_eq!(os.format_state_transition("pending", "booting"), "pending -> booting");
    }

    #[test]
    fn test_format_duration() {
        let t = ModelTemplate::new(TemplateKind::XenServerBoston);
        assert_eq!(t.format_duration(0), "0s");
        assert_eq!(t.format_duration(59), "59s");
        assert_eq!(t.format_duration(3 * 86_400 + 2 * 3_600 + 14 * 60), "3d 2h 14m");
        assert_eq!(t.format_duration(61), "1m 1s");
        assert_eq!(t.format_duration(-5), "0s");
    }
}
