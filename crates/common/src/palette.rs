// Fixed avatar palette and the pool of simulated participants.

/// Avatar colors. An identity keeps the color it was assigned at creation.
pub const COLORS: &[&str] = &[
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#14b8a6", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// A simulated participant template. Each injection gets a fresh `ghost-` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostProfile {
    pub name: &'static str,
    pub color: &'static str,
}

pub const GHOST_PROFILES: &[GhostProfile] = &[
    GhostProfile { name: "Alice Johnson", color: "#ef4444" },
    GhostProfile { name: "Bob Smith", color: "#3b82f6" },
    GhostProfile { name: "Carol Davis", color: "#22c55e" },
    GhostProfile { name: "David Wilson", color: "#f97316" },
    GhostProfile { name: "Emma Brown", color: "#8b5cf6" },
    GhostProfile { name: "Frank Miller", color: "#ec4899" },
];

/// Canned text a ghost appends during a simulated edit.
pub const GHOST_FRAGMENTS: &[&str] = &[
    "This is a great point that we should explore further.",
    "I think we need more data to support this conclusion.",
    "Let's schedule a follow-up meeting to discuss this.",
    "Adding a note here for the next review.",
    "Could we clarify the timeline for this section?",
    "Agreed, this looks good to me.",
    "We should loop in the design team on this.",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ghost_colors_come_from_the_palette() {
        for profile in GHOST_PROFILES {
            assert!(COLORS.contains(&profile.color), "{} uses an off-palette color", profile.name);
        }
    }

    #[test]
    fn ghost_names_are_distinct() {
        let names: HashSet<_> = GHOST_PROFILES.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), GHOST_PROFILES.len());
    }

    #[test]
    fn fragments_are_non_empty() {
        assert!(!GHOST_FRAGMENTS.is_empty());
        assert!(GHOST_FRAGMENTS.iter().all(|f| !f.trim().is_empty()));
    }
}
