use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use parkassist_core::{Color, Cycle, Distance, Thresholds, Zone};

#[derive(Clone)]
pub struct State {
    pub distance: Distance,
    pub offset: Distance,
    pub thresholds: Option<Thresholds>,
    pub zone: Zone,
    /// Last color written to the indicator, `None` before the first write.
    pub lit: Option<Color>,
    pub indicator_writes: u64,
    pub samples: u64,
    pub last_sample_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            distance: Distance::ZERO,
            offset: Distance::ZERO,
            thresholds: None,
            zone: Zone::Unknown,
            lit: None,
            indicator_writes: 0,
            samples: 0,
            last_sample_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn record_cycle(bb: &Blackboard, cycle: &Cycle) {
    let mut g = bb.write();
    g.distance = cycle.distance;
    g.offset = cycle.offset;
    g.thresholds = Some(cycle.thresholds);
    g.zone = cycle.zone;
    g.samples += 1;
    g.last_sample_ts = Instant::now();
}

pub fn record_lit(bb: &Blackboard, color: Color) {
    let mut g = bb.write();
    g.lit = Some(color);
    g.indicator_writes += 1;
}

pub fn raise_fault(bb: &Blackboard, msg: &str) -> bool {
    let mut g = bb.write();
    if g.faults.iter().any(|s| s == msg) {
        return false;
    }
    g.faults.push(msg.to_string());
    true
}

pub fn clear_fault(bb: &Blackboard, msg: &str) -> bool {
    let mut g = bb.write();
    let before = g.faults.len();
    g.faults.retain(|s| s != msg);
    g.faults.len() != before
}
