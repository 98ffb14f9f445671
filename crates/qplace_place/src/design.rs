//! A JSON chip database.
//!
//! [`Design`] is a small, self-describing netlist format: named nets, cells
//! with a footprint and pins, IO pins, and the floorplan (rows, core box,
//! core polygon). It implements [`ChipDatabase`] so the placer can run on
//! it directly.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use qplace_common::{InternalError, PlaceResult, Point, Rect};

use crate::db::{ChipDatabase, FixedPin, MovableInstance, PlaceStatus};
use crate::ids::{CellId, NetId};

/// Errors loading a design.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// The text is not a valid design document.
    #[error("invalid design JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A pin names a net that is not declared.
    #[error("{owner} refers to undeclared net `{net}`")]
    UnknownNet {
        /// Cell pin or IO pin that refers to the net.
        owner: String,
        /// The undeclared net name.
        net: String,
    },

    /// A net is declared twice.
    #[error("net `{0}` is declared more than once")]
    DuplicateNet(String),

    /// A cell has a non-positive footprint.
    #[error("cell `{0}` has an empty footprint")]
    EmptyFootprint(String),
}

/// A cell pin, positioned relative to the cell origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellPin {
    /// Pin name.
    pub name: String,
    /// Connected net, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    /// Centre of the pin shape relative to the cell origin.
    #[serde(default)]
    pub offset: Point,
}

/// A cell instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Instance name.
    pub name: String,
    /// Lower-left corner.
    #[serde(default)]
    pub origin: Point,
    /// Footprint width.
    pub width: i64,
    /// Footprint height.
    pub height: i64,
    /// Placement status; fixed cells are never moved.
    #[serde(default)]
    pub status: PlaceStatus,
    /// Pins.
    #[serde(default)]
    pub pins: Vec<CellPin>,
}

impl Cell {
    /// Returns the footprint at the current origin.
    pub fn footprint(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }
}

/// A top-level IO pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoPin {
    /// Pin name.
    pub name: String,
    /// Connected net, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    /// Centre of the pin shape.
    pub position: Point,
}

/// A whole design: floorplan plus netlist.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Design {
    /// Design name.
    #[serde(default)]
    pub name: String,
    /// Core box.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core: Option<Rect>,
    /// Core outline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub core_polygon: Vec<Point>,
    /// Placement rows.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Rect>,
    /// Net names; a net's id is its position here.
    #[serde(default)]
    pub nets: Vec<String>,
    /// Cell instances.
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// IO pins.
    #[serde(default)]
    pub io_pins: Vec<IoPin>,
}

impl Design {
    /// Parses and validates a design.
    pub fn from_json(text: &str) -> Result<Self, DesignError> {
        let design: Design = serde_json::from_str(text)?;
        design.validate()?;
        Ok(design)
    }

    /// Serializes the design as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks net references, net names and footprints.
    pub fn validate(&self) -> Result<(), DesignError> {
        let mut seen = HashSet::with_capacity(self.nets.len());
        for name in &self.nets {
            if !seen.insert(name.as_str()) {
                return Err(DesignError::DuplicateNet(name.clone()));
            }
        }
        let check = |owner: String, net: &Option<String>| match net {
            Some(net) if !seen.contains(net.as_str()) => Err(DesignError::UnknownNet {
                owner,
                net: net.clone(),
            }),
            _ => Ok(()),
        };
        for cell in &self.cells {
            if cell.width <= 0 || cell.height <= 0 {
                return Err(DesignError::EmptyFootprint(cell.name.clone()));
            }
            for pin in &cell.pins {
                check(format!("pin {}/{}", cell.name, pin.name), &pin.net)?;
            }
        }
        for pin in &self.io_pins {
            check(format!("io pin {}", pin.name), &pin.net)?;
        }
        Ok(())
    }

    /// Looks a cell up by name.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name == name)
    }

    fn net_ids(&self) -> HashMap<&str, NetId> {
        self.nets
            .iter()
            .enumerate()
            .map(|(k, name)| (name.as_str(), NetId::from_raw(k as u32)))
            .collect()
    }

    fn cell_mut(&mut self, handle: CellId) -> PlaceResult<&mut Cell> {
        self.cells
            .get_mut(handle.as_raw() as usize)
            .ok_or_else(|| InternalError::new(format!("no cell with handle {handle}")))
    }
}

impl ChipDatabase for Design {
    fn rows(&self) -> Vec<Rect> {
        self.rows.clone()
    }

    fn core_box(&self) -> Option<Rect> {
        self.core
    }

    fn core_polygon(&self) -> Vec<Point> {
        self.core_polygon.clone()
    }

    fn net_count(&self) -> usize {
        self.nets.len()
    }

    fn movable_instances(&self) -> Vec<MovableInstance> {
        let ids = self.net_ids();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.status != PlaceStatus::Fixed)
            .map(|(k, cell)| {
                let mut nets: Vec<NetId> = Vec::new();
                for net in cell.pins.iter().filter_map(|p| p.net.as_deref()) {
                    if let Some(&id) = ids.get(net) {
                        if !nets.contains(&id) {
                            nets.push(id);
                        }
                    }
                }
                MovableInstance {
                    handle: CellId::from_raw(k as u32),
                    footprint: cell.footprint(),
                    nets,
                }
            })
            .collect()
    }

    fn fixed_pins(&self) -> Vec<FixedPin> {
        let ids = self.net_ids();
        let cell_pins = self
            .cells
            .iter()
            .filter(|cell| cell.status == PlaceStatus::Fixed)
            .flat_map(|cell| {
                cell.pins.iter().map(move |pin| {
                    let center = Point::new(cell.origin.x + pin.offset.x, cell.origin.y + pin.offset.y);
                    (pin.net.as_deref(), center)
                })
            });
        let io_pins = self
            .io_pins
            .iter()
            .map(|pin| (pin.net.as_deref(), pin.position));

        cell_pins
            .chain(io_pins)
            .filter_map(|(net, center)| {
                let net = *ids.get(net?)?;
                Some(FixedPin { net, center })
            })
            .collect()
    }

    fn set_instance_location(&mut self, handle: CellId, origin: Point) -> PlaceResult<()> {
        self.cell_mut(handle)?.origin = origin;
        Ok(())
    }

    fn set_instance_status(&mut self, handle: CellId, status: PlaceStatus) -> PlaceResult<()> {
        self.cell_mut(handle)?.status = status;
        Ok(())
    }
}
