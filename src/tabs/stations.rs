use super::{NoticeQueue, Tab, TabKey};
use crate::bus::{PortId, StationId};
use itertools::Itertools;
use ratatui::{
    layout::Rect,
    widgets::{Block, List},
    Frame,
};
use std::collections::BTreeMap;

/// The heard-stations side pane. Discovery happens in the transport layer;
/// this just mirrors the latest list it was handed, grouped by port.
#[derive(Debug, Default)]
pub struct StationsTab {
    notices: NoticeQueue,
    stations: BTreeMap<PortId, Vec<StationId>>,
}

impl StationsTab {
    pub fn new(notices: NoticeQueue) -> Self {
        Self {
            notices,
            stations: BTreeMap::new(),
        }
    }

    pub fn update_stations(&mut self, stations: BTreeMap<PortId, Vec<StationId>>) {
        let heard_someone_new = stations
            .iter()
            .any(|(port, calls)| {
                let known = self.stations.get(port);
                calls.iter().any(|c| !known.is_some_and(|k| k.contains(c)))
            });

        self.stations = stations;
        if heard_someone_new {
            self.notices.push(TabKey::Stations);
        }
    }

    pub const fn stations(&self) -> &BTreeMap<PortId, Vec<StationId>> {
        &self.stations
    }
}

impl Tab for StationsTab {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items = self
            .stations
            .iter()
            .flat_map(|(port, calls)| calls.iter().map(move |c| format!("{c} [{port}]")))
            .collect_vec();
        frame.render_widget(
            List::new(items).block(Block::bordered().title(" Stations ")),
            area,
        );
    }
}
