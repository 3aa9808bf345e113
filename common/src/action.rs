use crate::types::ClimateAction;

pub fn calculate_action(
    current_temp: f32,
    target_temp: f32,
    heat_setpoint: f32,
    cool_setpoint: f32,
    tolerance: f32,
) -> ClimateAction {
    if current_temp < target_temp - tolerance && current_temp < heat_setpoint - tolerance {
        ClimateAction::Heating
    } else if current_temp > target_temp + tolerance && current_temp > cool_setpoint + tolerance {
        ClimateAction::Cooling
    } else {
        ClimateAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn heats_only_below_both_thresholds() {
        assert_eq!(
            calculate_action(16.0, 18.0, 18.0, 24.0, 0.2),
            ClimateAction::Heating
        );
        // Below the target band but above the heat rail.
        assert_eq!(
            calculate_action(19.0, 21.0, 18.0, 24.0, 0.5),
            ClimateAction::None
        );
    }

    #[test]
    fn cools_only_above_both_thresholds() {
        assert_eq!(
            calculate_action(26.0, 24.0, 18.0, 24.0, 0.5),
            ClimateAction::Cooling
        );
        // Above the target band but below the cool rail.
        assert_eq!(
            calculate_action(23.0, 21.0, 18.0, 24.0, 0.5),
            ClimateAction::None
        );
    }

    #[test]
    fn tolerance_boundaries_are_exclusive() {
        // 17.5 and 18.5 sit exactly on the band edges.
        assert_eq!(
            calculate_action(17.5, 18.0, 18.0, 18.0, 0.5),
            ClimateAction::None
        );
        assert_eq!(
            calculate_action(18.5, 18.0, 18.0, 18.0, 0.5),
            ClimateAction::None
        );
        assert_eq!(
            calculate_action(17.25, 18.0, 18.0, 18.0, 0.5),
            ClimateAction::Heating
        );
        assert_eq!(
            calculate_action(18.75, 18.0, 18.0, 18.0, 0.5),
            ClimateAction::Cooling
        );
    }

    #[test]
    fn zero_tolerance_inside_band_is_idle() {
        assert_eq!(
            calculate_action(20.0, 20.0, 20.0, 20.0, 0.0),
            ClimateAction::None
        );
    }

    proptest! {
        #[test]
        fn matches_band_definition(
            current in -10.0f32..40.0,
            target in 5.0f32..30.0,
            heat in 5.0f32..30.0,
            cool in 5.0f32..30.0,
            tolerance in 0.0f32..3.0,
        ) {
            let action = calculate_action(current, target, heat, cool, tolerance);
            let wants_heat = current < target - tolerance && current < heat - tolerance;
            let wants_cool = current > target + tolerance && current > cool + tolerance;

            let expected = if wants_heat {
                ClimateAction::Heating
            } else if wants_cool {
                ClimateAction::Cooling
            } else {
                ClimateAction::None
            };
            prop_assert_eq!(action, expected);
        }

        #[test]
        fn is_deterministic(
            current in -10.0f32..40.0,
            target in 5.0f32..30.0,
            heat in 5.0f32..30.0,
            cool in 5.0f32..30.0,
            tolerance in 0.0f32..3.0,
        ) {
            prop_assert_eq!(
                calculate_action(current, target, heat, cool, tolerance),
                calculate_action(current, target, heat, cool, tolerance)
            );
        }

        #[test]
        fn never_heats_at_or_above_target(
            offset in 0.0f32..10.0,
            target in 5.0f32..30.0,
            heat in 5.0f32..30.0,
            cool in 5.0f32..30.0,
            tolerance in 0.0f32..3.0,
        ) {
            let action = calculate_action(target + offset, target, heat, cool, tolerance);
            prop_assert_ne!(action, ClimateAction::Heating);
        }
    }
}
