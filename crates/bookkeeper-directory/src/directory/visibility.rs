use super::domain::Profile;

/// A profile may appear in any public listing only when it is active and has finished onboarding.
pub fn is_publicly_visible(profile: &Profile) -> bool {
    profile.is_active && profile.registration_completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::tests::common::profile;

    #[test]
    fn visibility_requires_both_flags() {
        let cases = [
            (false, false, false),
            (false, true, false),
            (true, false, false),
            (true, true, true),
        ];

        for (active, completed, expected) in cases {
            let mut candidate = profile("p-1", "Ana", "Marić");
            candidate.is_active = active;
            candidate.registration_completed = completed;
            assert_eq!(
                is_publicly_visible(&candidate),
                expected,
                "active={active} completed={completed}"
            );
        }
    }
}
