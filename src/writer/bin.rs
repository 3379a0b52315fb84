//! Dump the level data as one raw blob: the screen table followed by every
//! screen's rows in discovery order.

use crate::model::ProcessedWorld;

pub fn to_bytes(world: &ProcessedWorld) -> Vec<u8> {
    let mut blob = Vec::new();
    for record in &world.records {
        blob.extend_from_slice(&record.to_bytes());
    }
    for screen in &world.screens {
        for row in &screen.rows {
            blob.extend_from_slice(row);
        }
    }
    blob
}
