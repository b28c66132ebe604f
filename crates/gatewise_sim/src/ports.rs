//! Top-level port registry and bit-packed port access.
//!
//! Port names are resolved once to a [`PortHandle`]; every later access is an
//! index. Port values move in and out as [`BitVec`]s whose bit 0 is the
//! port's least significant bit. A [`PortShape`] reinterprets the same bits
//! as a sequence of fixed-width unsigned elements.

use crate::engine::read;
use crate::error::ConfigError;
use crate::hierarchy::{FlatNetId, Operand, TopPort};
use crate::toggle::ToggleTracker;
use gatewise_common::BitVec;
use gatewise_netlist::PortDirection;
use std::collections::HashMap;

/// A resolved reference to a top-level port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PortHandle(usize);

/// How a port's bits group into unsigned elements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PortShape {
    /// Number of elements.
    pub elements: u32,
    /// Bits per element.
    pub element_width: u32,
}

impl PortShape {
    /// One element spanning the whole port.
    pub fn flat(width: u32) -> Self {
        Self {
            elements: 1,
            element_width: width,
        }
    }

    /// Returns `elements * element_width`.
    pub fn width(self) -> usize {
        self.elements as usize * self.element_width as usize
    }
}

#[derive(Debug, Clone)]
struct PortEntry {
    name: String,
    direction: PortDirection,
    bits: Vec<Operand>,
    shape: PortShape,
}

/// All top-level ports, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    entries: Vec<PortEntry>,
    by_name: HashMap<String, PortHandle>,
}

impl PortRegistry {
    /// Builds the registry from resolved top ports. Every port starts with a
    /// flat shape.
    pub fn new(ports: &[TopPort]) -> Self {
        let mut registry = Self::default();
        for port in ports {
            let handle = PortHandle(registry.entries.len());
            registry.by_name.insert(port.name.clone(), handle);
            registry.entries.push(PortEntry {
                name: port.name.clone(),
                direction: port.direction,
                bits: port.bits.clone(),
                shape: PortShape::flat(port.bits.len() as u32),
            });
        }
        registry
    }

    /// Resolves a port name.
    pub fn handle(&self, name: &str) -> Result<PortHandle, ConfigError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownPort(name.to_string()))
    }

    fn entry(&self, handle: PortHandle) -> &PortEntry {
        &self.entries[handle.0]
    }

    /// Returns the port name.
    pub fn name(&self, handle: PortHandle) -> &str {
        &self.entry(handle).name
    }

    /// Iterates over port names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Returns the port direction.
    pub fn direction(&self, handle: PortHandle) -> PortDirection {
        self.entry(handle).direction
    }

    /// Returns the port width in bits.
    pub fn width(&self, handle: PortHandle) -> usize {
        self.entry(handle).bits.len()
    }

    /// Returns the configured shape.
    pub fn shape(&self, handle: PortHandle) -> PortShape {
        self.entry(handle).shape
    }

    /// Sets the element shape. The shape must cover the port exactly.
    pub fn set_shape(&mut self, handle: PortHandle, shape: PortShape) -> Result<(), ConfigError> {
        let entry = &mut self.entries[handle.0];
        if shape.width() != entry.bits.len() {
            return Err(ConfigError::ShapeMismatch {
                port: entry.name.clone(),
                width: entry.bits.len(),
                elements: shape.elements,
                element_width: shape.element_width,
            });
        }
        entry.shape = shape;
        Ok(())
    }

    /// Returns the net of a single-bit input port, for clock and reset roles.
    pub fn control_net(&self, handle: PortHandle) -> Result<FlatNetId, ConfigError> {
        let entry = self.entry(handle);
        match (entry.direction, entry.bits.as_slice()) {
            (PortDirection::Input, [Operand::Net(net)]) => Ok(*net),
            _ => Err(ConfigError::NotSingleBitInput(entry.name.clone())),
        }
    }

    /// Reads the current port value.
    pub fn get_bits(&self, handle: PortHandle, tracker: &ToggleTracker) -> BitVec {
        self.entry(handle)
            .bits
            .iter()
            .map(|&operand| read(tracker, operand))
            .collect()
    }

    /// Drives an input port. The buffer must be exactly as wide as the port.
    pub fn set_bits(
        &self,
        handle: PortHandle,
        value: &BitVec,
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        let entry = self.entry(handle);
        if entry.direction != PortDirection::Input {
            return Err(ConfigError::NotAnInput(entry.name.clone()));
        }
        if value.width() as usize != entry.bits.len() {
            return Err(ConfigError::WidthMismatch {
                port: entry.name.clone(),
                expected: entry.bits.len(),
                actual: value.width() as usize,
            });
        }
        for (&operand, bit) in entry.bits.iter().zip(value.iter()) {
            if let Operand::Net(net) = operand {
                tracker.write(net, bit);
            }
        }
        Ok(())
    }

    /// Reads the port as an unsigned integer.
    pub fn get_u64(&self, handle: PortHandle, tracker: &ToggleTracker) -> Result<u64, ConfigError> {
        self.get_bits(handle, tracker)
            .to_u64()
            .ok_or_else(|| self.too_wide(handle, self.width(handle)))
    }

    /// Drives an input port from an unsigned integer.
    pub fn set_u64(
        &self,
        handle: PortHandle,
        value: u64,
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        let width = self.width(handle);
        if width > 64 {
            return Err(self.too_wide(handle, width));
        }
        if width < 64 && value >> width != 0 {
            return Err(ConfigError::ValueOutOfRange {
                port: self.name(handle).to_string(),
                width: width as u32,
            });
        }
        self.set_bits(handle, &BitVec::from_u64(value, width as u32), tracker)
    }

    /// Reads the port as elements of the configured shape, lowest first.
    pub fn get_elements(
        &self,
        handle: PortHandle,
        tracker: &ToggleTracker,
    ) -> Result<Vec<u64>, ConfigError> {
        let shape = self.shape(handle);
        if shape.width() == 0 {
            return Ok(vec![0; shape.elements as usize]);
        }
        self.get_bits(handle, tracker)
            .to_elements(shape.element_width)
            .ok_or_else(|| self.too_wide(handle, shape.element_width as usize))
    }

    /// Drives an input port from elements of the configured shape.
    pub fn set_elements(
        &self,
        handle: PortHandle,
        elements: &[u64],
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        let shape = self.shape(handle);
        if elements.len() != shape.elements as usize {
            return Err(ConfigError::ElementCountMismatch {
                port: self.name(handle).to_string(),
                expected: shape.elements as usize,
                actual: elements.len(),
            });
        }
        if shape.width() == 0 {
            return self.set_bits(handle, &BitVec::new(0), tracker);
        }
        if shape.element_width > 64 {
            return Err(self.too_wide(handle, shape.element_width as usize));
        }
        let bits = BitVec::from_elements(elements, shape.element_width).ok_or_else(|| {
            ConfigError::ValueOutOfRange {
                port: self.name(handle).to_string(),
                width: shape.element_width,
            }
        })?;
        self.set_bits(handle, &bits, tracker)
    }

    fn too_wide(&self, handle: PortHandle, width: usize) -> ConfigError {
        ConfigError::PortTooWide {
            port: self.name(handle).to_string(),
            width,
        }
    }
}
