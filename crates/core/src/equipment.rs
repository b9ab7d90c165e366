use std::collections::BTreeMap;

use crate::models::{EquipmentCount, EquipmentReq, Inventory};

/// Equipment-type prefixes treated as mutually substitutable alternatives
/// (e.g. `dumbbells_3kg` vs `dumbbells_5kg`). Order is not significant.
const WEIGHT_FAMILIES: &[&str] = &["dumbbells", "kettlebells", "slam_balls"];

fn family_of(equipment_type: &str) -> Option<&'static str> {
    WEIGHT_FAMILIES
        .iter()
        .copied()
        .find(|family| equipment_type.starts_with(family))
}

/// §4.5 "Equipment option selection": when a requirement map contains more
/// than one entry sharing a weight-family prefix, collapse each family down
/// to the single best alternative. Non-family entries pass through
/// unchanged. Scoring: `(available - required) + required / max(available, 1)`,
/// restricted to alternatives with `available >= required`; if none
/// qualifies, the first-listed alternative in the family is kept so that
/// the resulting (still-infeasible) requirement is reported consistently.
pub fn resolve_equipment_alternatives(req: &EquipmentReq, inventory: &Inventory) -> EquipmentReq {
    let mut families: BTreeMap<&'static str, Vec<(&String, &EquipmentCount)>> = BTreeMap::new();
    let mut resolved = EquipmentReq::new();

    for (eq_type, count) in req {
        match family_of(eq_type) {
            Some(family) => families.entry(family).or_default().push((eq_type, count)),
            None => {
                resolved.insert(eq_type.clone(), *count);
            }
        }
    }

    for (_family, alternatives) in families {
        if alternatives.len() == 1 {
            let (eq_type, count) = alternatives[0];
            resolved.insert(eq_type.clone(), *count);
            continue;
        }

        let mut best: Option<(&String, &EquipmentCount, f64)> = None;
        for (eq_type, count) in &alternatives {
            let available = inventory.get(*eq_type).map(|c| c.count).unwrap_or(0);
            if available < count.count {
                continue;
            }
            let efficiency = available as f64 - count.count as f64;
            let utilization = count.count as f64 / (available.max(1) as f64);
            let score = efficiency + utilization;
            if best.map(|(_, _, s)| score > s).unwrap_or(true) {
                best = Some((eq_type, count, score));
            }
        }

        let (eq_type, count) = match best {
            Some((t, c, _)) => (t, c),
            None => (alternatives[0].0, alternatives[0].1),
        };
        resolved.insert(eq_type.clone(), *count);
    }

    resolved
}

/// §4.5: per-station requirement from a list of step equipment maps, keyed
/// on `people_per_station`. Sequential (1 person) takes the max per type
/// across steps; simultaneous (>1) sums across steps.
pub fn station_equipment_requirement(
    step_equipments: &[EquipmentReq],
    people_per_station: u32,
) -> EquipmentReq {
    let mut out = EquipmentReq::new();
    for step_req in step_equipments {
        for (eq_type, count) in step_req {
            let entry = out
                .entry(eq_type.clone())
                .or_insert(EquipmentCount { count: 0 });
            if people_per_station > 1 {
                entry.count += count.count;
            } else {
                entry.count = entry.count.max(count.count);
            }
        }
    }
    out
}

/// §4.5 admission check: for every equipment type, `cumulative + station <= inventory`.
pub fn can_admit_station(
    cumulative: &EquipmentReq,
    station_req: &EquipmentReq,
    inventory: &Inventory,
) -> bool {
    for (eq_type, station_count) in station_req {
        let have = inventory.get(eq_type).map(|c| c.count).unwrap_or(0);
        let used = cumulative.get(eq_type).map(|c| c.count).unwrap_or(0);
        if used + station_count.count > have {
            return false;
        }
    }
    true
}

pub fn add_station_usage(cumulative: &mut EquipmentReq, station_req: &EquipmentReq) {
    for (eq_type, count) in station_req {
        let entry = cumulative
            .entry(eq_type.clone())
            .or_insert(EquipmentCount { count: 0 });
        entry.count += count.count;
    }
}

/// §4.5 re-filter rule: drop any exercise whose own requirement would, on
/// its own, push some type's cumulative usage over inventory. Equivalent to
/// `filter_feasible` against `inventory - cumulative`.
pub fn remaining_inventory(inventory: &Inventory, cumulative: &EquipmentReq) -> Inventory {
    let mut out = Inventory::new();
    for (eq_type, have) in inventory {
        let used = cumulative.get(eq_type).map(|c| c.count).unwrap_or(0);
        out.insert(
            eq_type.clone(),
            EquipmentCount {
                count: have.count.saturating_sub(used),
            },
        );
    }
    out
}

pub fn merge_requirements(
    totals: &mut BTreeMap<String, crate::models::EquipmentRequirement>,
    station_req: &EquipmentReq,
) {
    for (eq_type, count) in station_req {
        let entry = totals
            .entry(eq_type.clone())
            .or_insert(crate::models::EquipmentRequirement { count: 0 });
        entry.count += count.count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(pairs: &[(&str, u32)]) -> EquipmentReq {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), EquipmentCount { count: *v }))
            .collect()
    }

    fn inv(pairs: &[(&str, u32)]) -> Inventory {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), EquipmentCount { count: *v }))
            .collect()
    }

    #[test]
    fn sequential_takes_max_across_steps() {
        let steps = vec![req(&[("barbells", 1)]), req(&[("barbells", 2)])];
        let result = station_equipment_requirement(&steps, 1);
        assert_eq!(result["barbells"].count, 2);
    }

    #[test]
    fn simultaneous_sums_across_steps() {
        let steps = vec![req(&[("barbells", 1)]), req(&[("barbells", 2)])];
        let result = station_equipment_requirement(&steps, 2);
        assert_eq!(result["barbells"].count, 3);
    }

    #[test]
    fn admission_respects_cumulative_plus_station() {
        let inventory = inv(&[("barbells", 2)]);
        let cumulative = req(&[("barbells", 1)]);
        assert!(can_admit_station(&cumulative, &req(&[("barbells", 1)]), &inventory));
        assert!(!can_admit_station(&cumulative, &req(&[("barbells", 2)]), &inventory));
    }

    #[test]
    fn weight_family_alternative_picks_best_scoring_option() {
        let inventory = inv(&[("dumbbells_3kg", 4), ("dumbbells_5kg", 2)]);
        // Needs 2 of either; dumbbells_3kg has more headroom.
        let requirement = req(&[("dumbbells_3kg", 2), ("dumbbells_5kg", 2)]);
        let resolved = resolve_equipment_alternatives(&requirement, &inventory);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key("dumbbells_3kg"));
    }

    #[test]
    fn weight_family_falls_back_to_first_when_none_qualify() {
        let inventory = inv(&[("kettlebells_8kg", 0), ("kettlebells_16kg", 0)]);
        let requirement = req(&[("kettlebells_8kg", 1), ("kettlebells_16kg", 1)]);
        let resolved = resolve_equipment_alternatives(&requirement, &inventory);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.contains_key("kettlebells_8kg"));
    }

    #[test]
    fn non_family_entries_pass_through_unchanged() {
        let inventory = inv(&[("plyo_box", 1)]);
        let requirement = req(&[("plyo_box", 1)]);
        let resolved = resolve_equipment_alternatives(&requirement, &inventory);
        assert_eq!(resolved, requirement);
    }
}
