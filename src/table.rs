//! Multi-station lookback table and the two text projections the firmware and
//! the simulation consume. Both projections borrow the same integers.

use std::fmt;

use ndarray::{Array2, ArrayView1};

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::calib::{StationId, Tier};

#[derive(Debug, Clone, PartialEq)]
pub struct StationLookback {
    pub id: StationId,
    /// `[channel][beam]` samples
    pub lookback: Array2<u32>,
    pub sources: Vec<Option<Tier>>,
    pub non_finite: Vec<(usize, usize)>,
}

impl StationLookback {
    pub fn nbeams(&self) -> usize {
        self.lookback.ncols()
    }

    pub fn beam(&self, beam: usize) -> ArrayView1<u32> {
        self.lookback.column(beam)
    }

    /// some channel fell back to zeros, flag for the operator
    pub fn is_degraded(&self) -> bool {
        self.sources.iter().any(Option::is_none) || !self.non_finite.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookbackTable {
    pub beam_angles: Vec<f64>,
    /// in processing order
    pub stations: Vec<StationLookback>,
}

pub fn assemble(beam_angles: Vec<f64>, stations: Vec<StationLookback>) -> LookbackTable {
    debug_assert!(stations.iter().all(|s| s.nbeams() == beam_angles.len()));
    LookbackTable {
        beam_angles,
        stations,
    }
}

impl LookbackTable {
    pub fn nbeams(&self) -> usize {
        self.beam_angles.len()
    }

    pub fn station(&self, id: StationId) -> Option<&StationLookback> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn get(&self, id: StationId, beam: usize, ch: usize) -> Option<u32> {
        self.station(id)?.lookback.get((ch, beam)).copied()
    }

    pub fn degraded(&self) -> impl Iterator<Item = StationId> + '_ {
        self.stations
            .iter()
            .filter(|s| s.is_degraded())
            .map(|s| s.id)
    }

    /// array literal as printed for the firmware build, station id first
    pub fn hardware(&self) -> HardwareView<'_> {
        HardwareView(self)
    }

    /// array literal as saved in the firmware source, with `--station` comments
    pub fn vhdl(&self) -> VhdlView<'_> {
        VhdlView(self)
    }

    /// `st_<id>` / `bm_<j>` / `ch_<k>` maps for the simulation
    pub fn nested(&self) -> NestedView<'_> {
        NestedView(self)
    }
}

fn write_beam_tuples(f: &mut fmt::Formatter<'_>, st: &StationLookback) -> fmt::Result {
    for beam in 0..st.nbeams() {
        if beam > 0 {
            f.write_str(",")?;
        }
        f.write_str("(")?;
        // firmware takes the highest channel first
        for (i, d) in st.beam(beam).iter().rev().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", d)?;
        }
        f.write_str(")")?;
    }
    Ok(())
}

fn write_literal(
    f: &mut fmt::Formatter<'_>,
    table: &LookbackTable,
    with_ids: bool,
) -> fmt::Result {
    let n = table.stations.len();
    for (i, st) in table.stations.iter().enumerate() {
        if with_ids {
            write!(f, "{} ", st.id)?;
        }
        f.write_str(if i == 0 { "((" } else { "(" })?;
        write_beam_tuples(f, st)?;
        f.write_str(if i + 1 == n { "));" } else { ")," })?;
        if !with_ids {
            write!(f, "--station {}", st.id)?;
        }
        f.write_str("\n")?;
    }
    Ok(())
}

pub struct HardwareView<'a>(&'a LookbackTable);

impl fmt::Display for HardwareView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_literal(f, self.0, true)
    }
}

pub struct VhdlView<'a>(&'a LookbackTable);

impl fmt::Display for VhdlView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_literal(f, self.0, false)
    }
}

pub struct NestedView<'a>(&'a LookbackTable);

struct BeamsView<'a>(&'a StationLookback);

struct ChannelsView<'a>(ArrayView1<'a, u32>);

impl Serialize for NestedView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.stations.len()))?;
        for st in &self.0.stations {
            map.serialize_entry(&format!("st_{}", st.id), &BeamsView(st))?;
        }
        map.end()
    }
}

impl Serialize for BeamsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nbeams = self.0.nbeams();
        let mut map = serializer.serialize_map(Some(nbeams))?;
        // bm_0 is the most negative steering angle
        for j in 0..nbeams {
            map.serialize_entry(
                &format!("bm_{}", j),
                &ChannelsView(self.0.beam(nbeams - 1 - j)),
            )?;
        }
        map.end()
    }
}

impl Serialize for ChannelsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (ch, d) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("ch_{}", ch), d)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn lookback(id: StationId, lookback: Array2<u32>) -> StationLookback {
        let nch = lookback.nrows();
        StationLookback {
            id,
            lookback,
            sources: vec![Some(Tier::Database); nch],
            non_finite: vec![],
        }
    }

    fn table() -> LookbackTable {
        assemble(
            vec![45.0, -45.0],
            vec![
                lookback(24, array![[0, 3], [1, 2], [2, 1], [3, 0]]),
                lookback(23, array![[4, 0], [0, 0], [0, 7], [12, 1]]),
            ],
        )
    }

    #[test]
    fn hardware_literal() {
        assert_eq!(
            table().hardware().to_string(),
            "24 (((3,2,1,0),(0,1,2,3)),\n23 ((12,0,0,4),(1,7,0,0)));\n"
        );
    }

    #[test]
    fn vhdl_literal() {
        assert_eq!(
            table().vhdl().to_string(),
            "(((3,2,1,0),(0,1,2,3)),--station 24\n((12,0,0,4),(1,7,0,0)));--station 23\n"
        );
    }

    #[test]
    fn single_station_closes_array() {
        let t = assemble(vec![0.0], vec![lookback(11, array![[0], [5]])]);
        assert_eq!(t.hardware().to_string(), "11 (((5,0)));\n");
    }

    #[test]
    fn nested_keys_and_order() {
        let text = serde_json::to_string(&table().nested()).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"st_24":{"bm_0":{"ch_0":3,"ch_1":2,"ch_2":1,"ch_3":0},"#,
                r#""bm_1":{"ch_0":0,"ch_1":1,"ch_2":2,"ch_3":3}},"#,
                r#""st_23":{"bm_0":{"ch_0":0,"ch_1":0,"ch_2":7,"ch_3":1},"#,
                r#""bm_1":{"ch_0":4,"ch_1":0,"ch_2":0,"ch_3":12}}}"#
            )
        );
    }

    #[test]
    fn lookup_and_degraded() {
        let mut t = table();
        assert_eq!(t.get(23, 0, 3), Some(12));
        assert_eq!(t.get(23, 2, 0), None);
        assert_eq!(t.get(99, 0, 0), None);
        assert_eq!(t.degraded().count(), 0);
        t.stations[1].sources[2] = None;
        assert_eq!(t.degraded().collect::<Vec<_>>(), vec![23]);
    }
}
