//! Fixtures shared by the unit tests.

use itertools::Itertools;

/// A minimal ITC2021 instance document with `teams` teams, `slots` slots and the given
/// constraint groups pasted into `<Constraints>`.
pub fn instance_xml(teams: usize, slots: usize, phased: bool, constraints: &str) -> String {
    let teams = (0..teams)
        .map(|t| format!(r#"<team id="{}" league="0" name="T{}"/>"#, t, t))
        .join("");
    let slots = (0..slots).map(|s| format!(r#"<slot id="{}" name="S{}"/>"#, s, s)).join("");
    format!(
        r#"<Instance>
  <MetaData><InstanceName>Test</InstanceName></MetaData>
  <Structure><Format leagueIds="0"><numberRoundRobin>2</numberRoundRobin><compactness>C</compactness><gameMode>{}</gameMode></Format></Structure>
  <ObjectiveFunction><Objective>SC</Objective></ObjectiveFunction>
  <Resources><Leagues><league id="0" name="L"/></Leagues><Teams>{}</Teams><Slots>{}</Slots></Resources>
  <Constraints>{}</Constraints>
</Instance>"#,
        if phased { "P" } else { "NULL" },
        teams,
        slots,
        constraints
    )
}

