//! Typed records for the ITC2021 constraint elements the compiler understands.
//!
//! Each element is parsed into its own record, with every attribute the translator needs
//! checked here. Literal-valued attributes that only have one meaningful value for this
//! compiler (e.g. `mode2="GLOBAL"` on CA2) are validated and dropped.

use crate::error::{Error, Result};
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

pub type TeamId = i64;
pub type SlotId = i64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Ca1,
    Ca2,
    Ca3,
    Ca4,
    Ga1,
    Se1,
    Br1,
    Br2,
    Fa2,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 9] = [
        ConstraintKind::Ca1,
        ConstraintKind::Ca2,
        ConstraintKind::Ca3,
        ConstraintKind::Ca4,
        ConstraintKind::Ga1,
        ConstraintKind::Se1,
        ConstraintKind::Br1,
        ConstraintKind::Br2,
        ConstraintKind::Fa2,
    ];

    /// Element name in the instance xml.
    pub fn tag(self) -> &'static str {
        match self {
            ConstraintKind::Ca1 => "CA1",
            ConstraintKind::Ca2 => "CA2",
            ConstraintKind::Ca3 => "CA3",
            ConstraintKind::Ca4 => "CA4",
            ConstraintKind::Ga1 => "GA1",
            ConstraintKind::Se1 => "SE1",
            ConstraintKind::Br1 => "BR1",
            ConstraintKind::Br2 => "BR2",
            ConstraintKind::Fa2 => "FA2",
        }
    }

    /// Prefix used for constraint and penalty variable names in the model.
    pub fn prefix(self) -> &'static str {
        match self {
            ConstraintKind::Ca1 => "ca1",
            ConstraintKind::Ca2 => "ca2",
            ConstraintKind::Ca3 => "ca3",
            ConstraintKind::Ca4 => "ca4",
            ConstraintKind::Ga1 => "ga1",
            ConstraintKind::Se1 => "se1",
            ConstraintKind::Br1 => "br1",
            ConstraintKind::Br2 => "br2",
            ConstraintKind::Fa2 => "fa2",
        }
    }

    pub fn from_tag(tag: &str) -> Option<ConstraintKind> {
        ConstraintKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strength {
    Hard,
    Soft(u32),
}

impl Strength {
    pub fn is_soft(self) -> bool {
        matches!(self, Strength::Soft(_))
    }
}

/// Which side of a match is counted: `H`, `A` or `HA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
    Both,
}

impl Side {
    pub fn counts_home(self) -> bool {
        self != Side::Away
    }

    pub fn counts_away(self) -> bool {
        self != Side::Home
    }

    fn code(self) -> &'static str {
        match self {
            Side::Home => "H",
            Side::Away => "A",
            Side::Both => "HA",
        }
    }
}

/// CA4 `mode2`: one bound over all slots together, or one bound per slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Every,
}

/// A game between two distinct teams, home team first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Match {
    home: TeamId,
    away: TeamId,
}

impl Match {
    pub fn new(home: TeamId, away: TeamId) -> Option<Match> {
        if home == away {
            return None;
        }
        Some(Match { home, away })
    }

    pub fn home(&self) -> TeamId {
        self.home
    }

    pub fn away(&self) -> TeamId {
        self.away
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ca1 {
    pub strength: Strength,
    pub min: u32,
    pub max: u32,
    pub mode: Side,
    pub teams: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ca2 {
    pub strength: Strength,
    pub min: u32,
    pub max: u32,
    pub mode1: Side,
    pub teams1: Vec<TeamId>,
    pub teams2: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ca3 {
    pub strength: Strength,
    pub min: u32,
    pub max: u32,
    pub intp: u32,
    pub mode1: Side,
    pub teams1: Vec<TeamId>,
    pub teams2: Vec<TeamId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ca4 {
    pub strength: Strength,
    pub min: u32,
    pub max: u32,
    pub mode1: Side,
    pub mode2: Scope,
    pub teams1: Vec<TeamId>,
    pub teams2: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ga1 {
    pub strength: Strength,
    pub min: u32,
    pub max: u32,
    pub slots: Vec<SlotId>,
    pub meetings: Vec<Match>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Se1 {
    pub strength: Strength,
    pub min: u32,
    pub teams: Vec<TeamId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Br1 {
    pub strength: Strength,
    pub intp: u32,
    pub mode2: Side,
    pub teams: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Br2 {
    pub strength: Strength,
    pub intp: u32,
    pub teams: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fa2 {
    pub strength: Strength,
    pub intp: u32,
    pub teams: Vec<TeamId>,
    pub slots: Vec<SlotId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintSpec {
    Ca1(Ca1),
    Ca2(Ca2),
    Ca3(Ca3),
    Ca4(Ca4),
    Ga1(Ga1),
    Se1(Se1),
    Br1(Br1),
    Br2(Br2),
    Fa2(Fa2),
}

impl ConstraintSpec {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintSpec::Ca1(_) => ConstraintKind::Ca1,
            ConstraintSpec::Ca2(_) => ConstraintKind::Ca2,
            ConstraintSpec::Ca3(_) => ConstraintKind::Ca3,
            ConstraintSpec::Ca4(_) => ConstraintKind::Ca4,
            ConstraintSpec::Ga1(_) => ConstraintKind::Ga1,
            ConstraintSpec::Se1(_) => ConstraintKind::Se1,
            ConstraintSpec::Br1(_) => ConstraintKind::Br1,
            ConstraintSpec::Br2(_) => ConstraintKind::Br2,
            ConstraintSpec::Fa2(_) => ConstraintKind::Fa2,
        }
    }

    pub fn strength(&self) -> Strength {
        match self {
            ConstraintSpec::Ca1(c) => c.strength,
            ConstraintSpec::Ca2(c) => c.strength,
            ConstraintSpec::Ca3(c) => c.strength,
            ConstraintSpec::Ca4(c) => c.strength,
            ConstraintSpec::Ga1(c) => c.strength,
            ConstraintSpec::Se1(c) => c.strength,
            ConstraintSpec::Br1(c) => c.strength,
            ConstraintSpec::Br2(c) => c.strength,
            ConstraintSpec::Fa2(c) => c.strength,
        }
    }

    /// Parses one constraint element. Returns `Ok(None)` for element names that are not
    /// one of the nine handled kinds.
    pub fn from_node(node: roxmltree::Node) -> Result<Option<ConstraintSpec>> {
        let kind = match ConstraintKind::from_tag(node.tag_name().name()) {
            Some(kind) => kind,
            None => return Ok(None),
        };
        let a = Attrs { node, kind };

        let spec = match kind {
            ConstraintKind::Ca1 => ConstraintSpec::Ca1(Ca1 {
                strength: a.strength()?,
                min: a.number_or("min", 0)?,
                max: a.number("max")?,
                mode: a.side("mode", false)?,
                teams: a.ids("teams")?,
                slots: a.ids("slots")?,
            }),
            ConstraintKind::Ca2 => {
                a.literal("mode2", "GLOBAL")?;
                ConstraintSpec::Ca2(Ca2 {
                    strength: a.strength()?,
                    min: a.number_or("min", 0)?,
                    max: a.number("max")?,
                    mode1: a.side("mode1", true)?,
                    teams1: a.ids("teams1")?,
                    teams2: a.ids("teams2")?,
                    slots: a.ids("slots")?,
                })
            }
            ConstraintKind::Ca3 => {
                a.literal("mode2", "SLOTS")?;
                ConstraintSpec::Ca3(Ca3 {
                    strength: a.strength()?,
                    min: a.number_or("min", 0)?,
                    max: a.number("max")?,
                    intp: a.number("intp")?,
                    mode1: a.side("mode1", true)?,
                    teams1: a.ids("teams1")?,
                    teams2: a.ids("teams2")?,
                })
            }
            ConstraintKind::Ca4 => {
                let mode2 = match a.required("mode2")? {
                    "GLOBAL" => Scope::Global,
                    "EVERY" => Scope::Every,
                    other => return Err(Error::unsupported(kind, "mode2", other)),
                };
                ConstraintSpec::Ca4(Ca4 {
                    strength: a.strength()?,
                    min: a.number_or("min", 0)?,
                    max: a.number("max")?,
                    mode1: a.side("mode1", true)?,
                    mode2,
                    teams1: a.ids("teams1")?,
                    teams2: a.ids("teams2")?,
                    slots: a.ids("slots")?,
                })
            }
            ConstraintKind::Ga1 => ConstraintSpec::Ga1(Ga1 {
                strength: a.strength()?,
                min: a.number_or("min", 0)?,
                max: a.number("max")?,
                slots: a.ids("slots")?,
                meetings: a.meetings("meetings")?,
            }),
            ConstraintKind::Se1 => {
                a.literal("mode1", "SLOTS")?;
                ConstraintSpec::Se1(Se1 {
                    strength: a.strength()?,
                    min: a.number("min")?,
                    teams: a.ids("teams")?,
                })
            }
            ConstraintKind::Br1 => {
                a.literal("mode1", "LEQ")?;
                ConstraintSpec::Br1(Br1 {
                    strength: a.strength()?,
                    intp: a.number("intp")?,
                    mode2: a.side("mode2", true)?,
                    teams: a.ids("teams")?,
                    slots: a.ids("slots")?,
                })
            }
            ConstraintKind::Br2 => {
                a.literal("homeMode", "HA")?;
                a.literal("mode2", "LEQ")?;
                ConstraintSpec::Br2(Br2 {
                    strength: a.strength()?,
                    intp: a.number("intp")?,
                    teams: a.ids("teams")?,
                    slots: a.ids("slots")?,
                })
            }
            ConstraintKind::Fa2 => {
                a.literal("mode", "H")?;
                ConstraintSpec::Fa2(Fa2 {
                    strength: a.strength()?,
                    intp: a.number("intp")?,
                    teams: a.ids("teams")?,
                    slots: a.ids("slots")?,
                })
            }
        };
        Ok(Some(spec))
    }

    /// Checks that every team and slot the constraint mentions exists.
    pub fn check_ids(&self, team_count: usize, slot_count: usize) -> Result<()> {
        let kind = self.kind();
        let teams = |ids: &[TeamId]| in_range(kind, "team", ids, team_count);
        let slots = |ids: &[SlotId]| in_range(kind, "slot", ids, slot_count);
        match self {
            ConstraintSpec::Ca1(c) => {
                teams(&c.teams)?;
                slots(&c.slots)
            }
            ConstraintSpec::Ca2(c) => {
                teams(&c.teams1)?;
                teams(&c.teams2)?;
                slots(&c.slots)
            }
            ConstraintSpec::Ca3(c) => {
                teams(&c.teams1)?;
                teams(&c.teams2)
            }
            ConstraintSpec::Ca4(c) => {
                teams(&c.teams1)?;
                teams(&c.teams2)?;
                slots(&c.slots)
            }
            ConstraintSpec::Ga1(c) => {
                let ids = c.meetings.iter().flat_map(|m| vec![m.home(), m.away()]).collect::<Vec<_>>();
                teams(&ids)?;
                slots(&c.slots)
            }
            ConstraintSpec::Se1(c) => teams(&c.teams),
            ConstraintSpec::Br1(c) => {
                teams(&c.teams)?;
                slots(&c.slots)
            }
            ConstraintSpec::Br2(c) => {
                teams(&c.teams)?;
                slots(&c.slots)
            }
            ConstraintSpec::Fa2(c) => {
                teams(&c.teams)?;
                slots(&c.slots)
            }
        }
    }
}

fn in_range(kind: ConstraintKind, what: &str, ids: &[i64], count: usize) -> Result<()> {
    match ids.iter().find(|id| **id < 0 || **id as usize >= count) {
        Some(id) => Err(Error::Structure(format!("{} refers to unknown {} {}", kind, what, id))),
        None => Ok(()),
    }
}

struct Attrs<'a, 'input> {
    node: roxmltree::Node<'a, 'input>,
    kind: ConstraintKind,
}

impl<'a, 'input> Attrs<'a, 'input> {
    fn required(&self, name: &'static str) -> Result<&'a str> {
        self.node.attribute(name).ok_or(Error::MissingAttribute {
            kind: self.kind,
            attribute: name,
        })
    }

    fn malformed(&self, name: &'static str, value: &str) -> Error {
        Error::MalformedAttribute {
            kind: self.kind,
            attribute: name,
            value: value.to_string(),
        }
    }

    fn number<T: FromStr>(&self, name: &'static str) -> Result<T> {
        let value = self.required(name)?;
        value.trim().parse::<T>().map_err(|_| self.malformed(name, value))
    }

    fn number_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T> {
        match self.node.attribute(name) {
            Some(_) => self.number(name),
            None => Ok(default),
        }
    }

    fn ids(&self, name: &'static str) -> Result<Vec<i64>> {
        let value = self.required(name)?;
        value
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| self.malformed(name, value)))
            .collect()
    }

    fn meetings(&self, name: &'static str) -> Result<Vec<Match>> {
        let value = self.required(name)?;
        value
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (home, away) = pair
                    .split(',')
                    .map(|i| i.trim().parse::<TeamId>())
                    .collect_tuple::<(_, _)>()
                    .ok_or_else(|| self.malformed(name, value))?;
                match (home, away) {
                    (Ok(home), Ok(away)) => Match::new(home, away).ok_or_else(|| {
                        Error::Structure(format!("{} meeting {} has the same team on both sides", self.kind, pair))
                    }),
                    _ => Err(self.malformed(name, value)),
                }
            })
            .collect()
    }

    fn literal(&self, name: &'static str, expected: &str) -> Result<()> {
        let value = self.required(name)?;
        if value != expected {
            return Err(Error::unsupported(self.kind, name, value));
        }
        Ok(())
    }

    fn strength(&self) -> Result<Strength> {
        match self.required("type")? {
            "HARD" => Ok(Strength::Hard),
            "SOFT" => Ok(Strength::Soft(self.number("penalty")?)),
            other => Err(Error::unsupported(self.kind, "type", other)),
        }
    }

    fn side(&self, name: &'static str, allow_both: bool) -> Result<Side> {
        match self.required(name)? {
            "H" => Ok(Side::Home),
            "A" => Ok(Side::Away),
            "HA" if allow_both => Ok(Side::Both),
            other => Err(Error::unsupported(self.kind, name, other)),
        }
    }
}

// One-line description of a spec, written as a comment above its constraints.

fn list(ids: &[i64]) -> String {
    ids.iter().join(";")
}

fn strength(s: Strength) -> String {
    match s {
        Strength::Hard => "type=HARD".to_string(),
        Strength::Soft(p) => format!("type=SOFT penalty={}", p),
    }
}

impl fmt::Display for ConstraintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), strength(self.strength()))?;
        match self {
            ConstraintSpec::Ca1(c) => write!(
                f,
                " mode={} teams={} slots={} min={} max={}",
                c.mode.code(),
                list(&c.teams),
                list(&c.slots),
                c.min,
                c.max
            ),
            ConstraintSpec::Ca2(c) => write!(
                f,
                " mode1={} mode2=GLOBAL teams1={} teams2={} slots={} min={} max={}",
                c.mode1.code(),
                list(&c.teams1),
                list(&c.teams2),
                list(&c.slots),
                c.min,
                c.max
            ),
            ConstraintSpec::Ca3(c) => write!(
                f,
                " mode1={} mode2=SLOTS intp={} teams1={} teams2={} min={} max={}",
                c.mode1.code(),
                c.intp,
                list(&c.teams1),
                list(&c.teams2),
                c.min,
                c.max
            ),
            ConstraintSpec::Ca4(c) => write!(
                f,
                " mode1={} mode2={} teams1={} teams2={} slots={} min={} max={}",
                c.mode1.code(),
                match c.mode2 {
                    Scope::Global => "GLOBAL",
                    Scope::Every => "EVERY",
                },
                list(&c.teams1),
                list(&c.teams2),
                list(&c.slots),
                c.min,
                c.max
            ),
            ConstraintSpec::Ga1(c) => write!(
                f,
                " meetings={} slots={} min={} max={}",
                c.meetings.iter().map(|m| format!("{},{}", m.home(), m.away())).join(";"),
                list(&c.slots),
                c.min,
                c.max
            ),
            ConstraintSpec::Se1(c) => write!(f, " mode1=SLOTS teams={} min={}", list(&c.teams), c.min),
            ConstraintSpec::Br1(c) => write!(
                f,
                " mode1=LEQ mode2={} teams={} slots={} intp={}",
                c.mode2.code(),
                list(&c.teams),
                list(&c.slots),
                c.intp
            ),
            ConstraintSpec::Br2(c) => write!(
                f,
                " homeMode=HA mode2=LEQ teams={} slots={} intp={}",
                list(&c.teams),
                list(&c.slots),
                c.intp
            ),
            ConstraintSpec::Fa2(c) => write!(
                f,
                " mode=H teams={} slots={} intp={}",
                list(&c.teams),
                list(&c.slots),
                c.intp
            ),
        }
    }
}
