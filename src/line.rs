use std::fmt::Write as _;
use std::time::Duration;

use log::info;

/// Stations in line order. An item visits every station exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Station {
    Cut,
    Stamp,
    Paint,
    Inspect,
    Output,
}

impl Station {
    pub const ALL: [Station; 5] = [
        Station::Cut,
        Station::Stamp,
        Station::Paint,
        Station::Inspect,
        Station::Output,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Station::Cut => "cut",
            Station::Stamp => "stamp",
            Station::Paint => "paint",
            Station::Inspect => "inspect",
            Station::Output => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Disc,
    Plate,
    Bracket,
}

const SHAPES: [Shape; 3] = [Shape::Disc, Shape::Plate, Shape::Bracket];
const PALETTE: [&str; 4] = ["red", "blue", "green", "yellow"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Item {
    pub serial: u32,
    pub shape: Option<Shape>,
    pub stamped: bool,
    pub color: Option<&'static str>,
    pub passed: Option<bool>,
}

impl Item {
    fn blank(serial: u32) -> Self {
        Item {
            serial,
            shape: None,
            stamped: false,
            color: None,
            passed: None,
        }
    }
}

/// Five stations, each holding at most one in-flight item. A single tick
/// advances every item one station downstream; transforms are keyed on the
/// item serial, so the same tick count always yields the same line state.
#[derive(Debug)]
pub(crate) struct AssemblyLine {
    stations: [Option<Item>; 5],
    next_serial: u32,
    ticks: u64,
    completed: Vec<Item>,
}

impl AssemblyLine {
    pub fn new() -> Self {
        AssemblyLine {
            stations: [None, None, None, None, None],
            next_serial: 1,
            ticks: 0,
            completed: vec![],
        }
    }

    fn apply(station: Station, item: &mut Item) {
        match station {
            Station::Cut => {
                item.shape = Some(SHAPES[item.serial as usize % SHAPES.len()]);
            }
            Station::Stamp => {
                item.stamped = true;
            }
            Station::Paint => {
                item.color = Some(PALETTE[item.serial as usize % PALETTE.len()]);
            }
            Station::Inspect => {
                item.passed = Some(item.shape.is_some() && item.stamped && item.color.is_some());
            }
            Station::Output => {}
        }
    }

    /// Advances the line by one step: the output station's item completes,
    /// the rest move one station downstream (downstream-first, so a vacated
    /// slot is refilled within the same tick), and a fresh blank enters the
    /// cut station if it is empty.
    pub fn tick(&mut self) {
        self.ticks += 1;

        if let Some(item) = self.stations[4].take() {
            self.completed.push(item);
        }
        for i in (0..4).rev() {
            if self.stations[i + 1].is_none() {
                if let Some(mut item) = self.stations[i].take() {
                    Self::apply(Station::ALL[i + 1], &mut item);
                    self.stations[i + 1] = Some(item);
                }
            }
        }
        if self.stations[0].is_none() {
            let mut item = Item::blank(self.next_serial);
            self.next_serial += 1;
            Self::apply(Station::Cut, &mut item);
            self.stations[0] = Some(item);
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn completed(&self) -> &[Item] {
        &self.completed
    }

    /// Serial of the item at each station, in line order.
    pub fn occupancy(&self) -> [Option<u32>; 5] {
        let mut occ = [None; 5];
        for (i, slot) in self.stations.iter().enumerate() {
            occ[i] = slot.as_ref().map(|item| item.serial);
        }
        occ
    }

    pub fn describe(&self) -> String {
        let mut res = String::new();
        for (station, slot) in Station::ALL.iter().zip(self.stations.iter()) {
            let _ = match slot {
                Some(item) => write!(res, "{}[#{}] ", station.name(), item.serial),
                None => write!(res, "{}[ ] ", station.name()),
            };
        }
        let _ = write!(res, "done={}", self.completed.len());
        res
    }
}

pub(crate) fn run(ticks: u64, interval: Duration) -> AssemblyLine {
    let mut line = AssemblyLine::new();
    for _ in 0..ticks {
        line.tick();
        info!("tick {:>3}: {}", line.ticks(), line.describe());
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
    let passed = line
        .completed()
        .iter()
        .filter(|item| item.passed == Some(true))
        .count();
    info!(
        "completed {} items, {} passed inspection",
        line.completed().len(),
        passed
    );
    line
}
