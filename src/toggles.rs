//! Viewer feature switches.
//!
//! The four toolbar buttons each flip one [`Toggle`]. Gradient background and
//! auto-rotate are mutually exclusive: turning either one on turns the other
//! off. Every call reports what actually changed so callers can log and sync
//! dependent state (the orbit controller, the background slot).

/// A user-facing on/off feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Toggle {
    AutoRotate,
    OrbitControls,
    LightHelpers,
    GradientBackground,
}

impl Toggle {
    /// Toolbar order.
    pub const ALL: [Toggle; 4] = [
        Toggle::AutoRotate,
        Toggle::OrbitControls,
        Toggle::LightHelpers,
        Toggle::GradientBackground,
    ];

    /// Button caption.
    pub const fn label(self) -> &'static str {
        match self {
            Toggle::AutoRotate => "Auto-rotate",
            Toggle::OrbitControls => "Orbit",
            Toggle::LightHelpers => "Light helpers",
            Toggle::GradientBackground => "Gradient BG",
        }
    }
}

/// A toggle that changed value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleChange {
    pub toggle: Toggle,
    pub enabled: bool,
}

/// Current value of every [`Toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerToggles {
    pub auto_rotate: bool,
    pub orbit_enabled: bool,
    pub light_helpers_visible: bool,
    pub gradient_background: bool,
}

impl Default for ViewerToggles {
    fn default() -> Self {
        Self {
            auto_rotate: false,
            orbit_enabled: true,
            light_helpers_visible: true,
            gradient_background: false,
        }
    }
}

impl ViewerToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::AutoRotate => self.auto_rotate,
            Toggle::OrbitControls => self.orbit_enabled,
            Toggle::LightHelpers => self.light_helpers_visible,
            Toggle::GradientBackground => self.gradient_background,
        }
    }

    fn slot(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::AutoRotate => &mut self.auto_rotate,
            Toggle::OrbitControls => &mut self.orbit_enabled,
            Toggle::LightHelpers => &mut self.light_helpers_visible,
            Toggle::GradientBackground => &mut self.gradient_background,
        }
    }

    /// The toggle that `toggle` switches off when enabled, if any.
    pub const fn exclusive_with(toggle: Toggle) -> Option<Toggle> {
        match toggle {
            Toggle::AutoRotate => Some(Toggle::GradientBackground),
            Toggle::GradientBackground => Some(Toggle::AutoRotate),
            Toggle::OrbitControls | Toggle::LightHelpers => None,
        }
    }

    /// Set a toggle, enforcing mutual exclusion. Returns the changes made,
    /// the requested toggle first.
    pub fn set(&mut self, toggle: Toggle, enabled: bool) -> Vec<ToggleChange> {
        let mut changes = Vec::with_capacity(2);

        if std::mem::replace(self.slot(toggle), enabled) != enabled {
            changes.push(ToggleChange { toggle, enabled });
        }

        if enabled {
            if let Some(other) = Self::exclusive_with(toggle) {
                if std::mem::replace(self.slot(other), false) {
                    changes.push(ToggleChange {
                        toggle: other,
                        enabled: false,
                    });
                }
            }
        }

        changes
    }

    /// Flip a toggle. See [`ViewerToggles::set`].
    pub fn flip(&mut self, toggle: Toggle) -> Vec<ToggleChange> {
        let enabled = !self.get(toggle);
        self.set(toggle, enabled)
    }

    /// Resolve a conflicting initial configuration: gradient background wins
    /// over auto-rotate.
    pub fn normalized(mut self) -> Self {
        if self.gradient_background {
            self.auto_rotate = false;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_initial_scene() {
        let toggles = ViewerToggles::default();
        assert!(!toggles.auto_rotate);
        assert!(toggles.orbit_enabled);
        assert!(toggles.light_helpers_visible);
        assert!(!toggles.gradient_background);
    }

    #[test]
    fn enabling_gradient_disables_auto_rotate() {
        let mut toggles = ViewerToggles {
            auto_rotate: true,
            ..Default::default()
        };
        let changes = toggles.flip(Toggle::GradientBackground);

        assert!(toggles.gradient_background);
        assert!(!toggles.auto_rotate);
        assert_eq!(
            changes,
            vec![
                ToggleChange {
                    toggle: Toggle::GradientBackground,
                    enabled: true
                },
                ToggleChange {
                    toggle: Toggle::AutoRotate,
                    enabled: false
                },
            ]
        );
    }

    #[test]
    fn enabling_auto_rotate_disables_gradient() {
        let mut toggles = ViewerToggles {
            gradient_background: true,
            ..Default::default()
        };
        toggles.set(Toggle::AutoRotate, true);
        assert!(toggles.auto_rotate);
        assert!(!toggles.gradient_background);
    }

    #[test]
    fn disabling_leaves_the_partner_alone() {
        let mut toggles = ViewerToggles {
            auto_rotate: true,
            ..Default::default()
        };
        let changes = toggles.set(Toggle::GradientBackground, false);
        assert!(changes.is_empty());
        assert!(toggles.auto_rotate);
    }

    #[test]
    fn independent_toggles_do_not_interact() {
        let mut toggles = ViewerToggles {
            auto_rotate: true,
            ..Default::default()
        };
        toggles.flip(Toggle::OrbitControls);
        toggles.flip(Toggle::LightHelpers);
        assert!(toggles.auto_rotate);
        assert!(!toggles.orbit_enabled);
        assert!(!toggles.light_helpers_visible);
    }

    #[test]
    fn setting_the_same_value_reports_nothing() {
        let mut toggles = ViewerToggles::default();
        assert!(toggles.set(Toggle::OrbitControls, true).is_empty());
    }

    #[test]
    fn normalized_prefers_gradient() {
        let toggles = ViewerToggles {
            auto_rotate: true,
            gradient_background: true,
            ..Default::default()
        }
        .normalized();
        assert!(!toggles.auto_rotate);
        assert!(toggles.gradient_background);
    }
}
