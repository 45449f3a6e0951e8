use crate::constraints::{ConstraintKind, ConstraintSpec, Match, SlotId, TeamId};
use crate::error::{Error, Result};
use itertools::Itertools;
use log::*;

/// An ITC2021 instance as far as the model compiler is concerned.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub name: Option<String>,
    /// Team ids in document order; always a permutation of `0..teams`.
    pub teams: Vec<TeamId>,
    /// Slot ids in document order; always a permutation of `0..slots`.
    pub slots: Vec<SlotId>,
    pub phased: bool,
    /// Constraint specs in document order.
    pub constraints: Vec<ConstraintSpec>,
}

fn element_text<'a>(root: roxmltree::Node<'a, '_>, tag: &str) -> Option<&'a str> {
    root.descendants()
        .find(|n| n.tag_name().name() == tag)
        .and_then(|n| n.text())
        .map(str::trim)
}

fn resource_ids(root: roxmltree::Node, tag: &'static str) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for node in root.descendants().filter(|n| n.tag_name().name() == tag) {
        let id = node
            .attribute("id")
            .ok_or_else(|| Error::Structure(format!("<{}> without id", tag)))?;
        ids.push(
            id.trim()
                .parse::<i64>()
                .map_err(|_| Error::Structure(format!("<{}> has malformed id \"{}\"", tag, id)))?,
        );
    }
    if ids.is_empty() {
        return Err(Error::MissingElement(tag));
    }

    // Everything downstream indexes with `{ 0 .. n - 1 }`.
    if !ids.iter().copied().sorted().eq(0..ids.len() as i64) {
        return Err(Error::Structure(format!("{} ids must be exactly 0..{}, got {:?}", tag, ids.len(), ids)));
    }
    Ok(ids)
}

/// roxmltree keeps whatever it read when the input stops inside an element. Such an
/// element's range never grows past its start tag.
fn check_closed(doc: &roxmltree::Document) -> Result<()> {
    for node in doc.root().descendants().filter(|n| n.is_element()) {
        let text = &doc.input_text()[node.range()];
        if !text.ends_with("/>") && !text.contains("</") {
            let pos = doc.text_pos_at(node.range().start);
            return Err(Error::Unclosed {
                tag: node.tag_name().name().to_string(),
                row: pos.row,
                col: pos.col,
            });
        }
    }
    Ok(())
}

impl Instance {
    pub fn parse(xml: &str) -> Result<Instance> {
        let doc = roxmltree::Document::parse(xml)?;
        check_closed(&doc)?;
        info!("Parsed document");
        let root = doc.root_element();
        if root.tag_name().name() != "Instance" {
            warn!("Root element is <{}>, expected <Instance>", root.tag_name().name());
        }

        let name = element_text(root, "InstanceName").map(|s| s.to_string());
        let phased = element_text(root, "gameMode") == Some("P");
        if let Some(rr) = element_text(root, "numberRoundRobin") {
            if rr != "2" {
                warn!("numberRoundRobin is {}, the model assumes a double round robin", rr);
            }
        }

        let teams = resource_ids(root, "team")?;
        let slots = resource_ids(root, "slot")?;
        if teams.len() < 2 || teams.len() % 2 != 0 {
            return Err(Error::Structure(format!("need an even number of teams, got {}", teams.len())));
        }
        if slots.len() != 2 * (teams.len() - 1) {
            warn!(
                "{} teams and {} slots is not a compact double round robin",
                teams.len(),
                slots.len()
            );
        }
        info!("teams: {:?}", teams);
        info!("slots: {:?}", slots);
        info!("PHASED: {}", phased);

        let mut constraints = Vec::new();
        if let Some(group) = root.children().find(|n| n.tag_name().name() == "Constraints") {
            for node in group.descendants().filter(|n| n.is_element()) {
                match ConstraintSpec::from_node(node)? {
                    Some(spec) => {
                        spec.check_ids(teams.len(), slots.len())?;
                        constraints.push(spec);
                    }
                    None => {
                        if !node.has_children() {
                            debug!("Skipping unhandled constraint <{}>", node.tag_name().name());
                        }
                    }
                }
            }
        }
        info!("Loaded {} constraints", constraints.len());

        Ok(Instance {
            name,
            teams,
            slots,
            phased,
            constraints,
        })
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// All ordered pairs of distinct teams.
    pub fn matches(&self) -> impl Iterator<Item = Match> + '_ {
        let n = self.team_count() as TeamId;
        (0..n).cartesian_product(0..n).filter_map(|(home, away)| Match::new(home, away))
    }

    /// Number of `x[m,n,s]` variables in the generated model.
    pub fn x_variable_count(&self) -> usize {
        self.matches().count() * self.slot_count()
    }

    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn soft_count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints
            .iter()
            .filter(|c| c.kind() == kind && c.strength().is_soft())
            .count()
    }

    /// Whether break indicator variables are needed.
    pub fn has_breaks(&self) -> bool {
        self.count_of(ConstraintKind::Br1) + self.count_of(ConstraintKind::Br2) > 0
    }

    /// Whether cumulative home game counters are needed.
    pub fn has_fa2(&self) -> bool {
        self.count_of(ConstraintKind::Fa2) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Strength;
    use crate::test_utils::instance_xml;

    #[test]
    fn loads_universe_and_constraints_in_order() {
        let xml = instance_xml(
            4,
            6,
            true,
            r#"<BreakConstraints><BR1 intp="0" mode1="LEQ" mode2="HA" penalty="5" slots="4" teams="0" type="SOFT"/></BreakConstraints>
               <CapacityConstraints><CA1 max="1" min="0" mode="H" penalty="1" slots="0;1;2" teams="0" type="HARD"/></CapacityConstraints>"#,
        );
        let inst = Instance::parse(&xml).unwrap();
        assert_eq!(inst.name.as_deref(), Some("Test"));
        assert_eq!(inst.teams, vec![0, 1, 2, 3]);
        assert_eq!(inst.slot_count(), 6);
        assert!(inst.phased);
        let kinds = inst.constraints.iter().map(|c| c.kind()).collect::<Vec<_>>();
        assert_eq!(kinds, vec![ConstraintKind::Br1, ConstraintKind::Ca1]);
        assert_eq!(inst.constraints[0].strength(), Strength::Soft(5));
        assert!(inst.has_breaks());
        assert!(!inst.has_fa2());
        assert_eq!(inst.soft_count_of(ConstraintKind::Ca1), 0);
    }

    #[test]
    fn x_variable_count() {
        let inst = Instance::parse(&instance_xml(6, 10, false, "")).unwrap();
        assert_eq!(inst.x_variable_count(), 6 * 5 * 10);
        assert!(inst.matches().all(|m| m.home() != m.away()));
    }

    #[test]
    fn unknown_constraint_kinds_are_ignored() {
        let xml = instance_xml(
            4,
            6,
            false,
            r#"<CapacityConstraints><CA9 max="1" type="HARD"/></CapacityConstraints>"#,
        );
        assert!(Instance::parse(&xml).unwrap().constraints.is_empty());
    }

    #[test]
    fn odd_team_count_is_rejected() {
        let err = Instance::parse(&instance_xml(3, 4, false, "")).unwrap_err();
        assert!(matches!(err, Error::Structure(_)));
    }

    #[test]
    fn gaps_in_ids_are_rejected() {
        let xml = instance_xml(4, 6, false, "").replace(r#"<slot id="5""#, r#"<slot id="7""#);
        assert!(matches!(Instance::parse(&xml), Err(Error::Structure(_))));
    }

    #[test]
    fn constraint_with_unknown_team_is_rejected() {
        let xml = instance_xml(
            4,
            6,
            false,
            r#"<CapacityConstraints><CA1 max="1" min="0" mode="H" penalty="1" slots="0" teams="9" type="HARD"/></CapacityConstraints>"#,
        );
        assert!(matches!(Instance::parse(&xml), Err(Error::Structure(_))));
    }

    #[test]
    fn missing_slots() {
        let xml = instance_xml(4, 6, false, "").replace("<slot", "<sloth");
        assert!(matches!(Instance::parse(&xml), Err(Error::MissingElement("slot"))));
    }

    #[test]
    fn broken_xml() {
        assert!(matches!(Instance::parse("<Instance><team id=\"0\"/></Slots>"), Err(Error::Xml(_))));
    }

    #[test]
    fn truncated_document_is_rejected() {
        let xml = instance_xml(
            4,
            6,
            false,
            r#"<CapacityConstraints>
                 <CA1 max="1" min="0" mode="H" penalty="1" slots="0" teams="0" type="HARD"/>
                 <CA1 max="1" min="0" mode="H" penalty="1" slots="1" teams="1" type="HARD"/>
               </CapacityConstraints>"#,
        );
        assert_eq!(Instance::parse(&xml).unwrap().constraints.len(), 2);

        let cut = xml.rfind("<CA1").unwrap();
        match Instance::parse(&xml[..cut]) {
            Err(Error::Unclosed { tag, .. }) => assert_eq!(tag, "Instance"),
            other => panic!("expected unclosed element, got {:?}", other),
        }
        assert!(matches!(Instance::parse("<Instance>"), Err(Error::Unclosed { .. })));
    }
}
