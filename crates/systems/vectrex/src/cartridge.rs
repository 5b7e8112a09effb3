//! Vectrex cartridge slot
//!
//! Cartridges are plain ROM images mapped from $0000 upward, up to the full
//! 64K window; no banking. The slot keeps a zero-padded copy of the whole
//! window so unused addresses read as 0.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::CART_CAPACITY;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("Empty cartridge image")]
    Empty,
    #[error("Cartridge image is {size} bytes, slot holds {capacity}")]
    TooLarge { size: usize, capacity: usize },
}

/// The 64K cartridge window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    data: Vec<u8>,
    /// Length of the image that was loaded, 0 when the slot is empty
    image_len: usize,
}

impl Cartridge {
    pub fn new() -> Self {
        Self {
            data: vec![0; CART_CAPACITY],
            image_len: 0,
        }
    }

    /// Check an image without loading it.
    pub fn validate(image: &[u8]) -> Result<(), CartridgeError> {
        if image.is_empty() {
            return Err(CartridgeError::Empty);
        }
        if image.len() > CART_CAPACITY {
            return Err(CartridgeError::TooLarge {
                size: image.len(),
                capacity: CART_CAPACITY,
            });
        }
        Ok(())
    }

    /// Replace the slot contents with `image`, zero-filling the rest.
    /// On error the slot is left as it was.
    pub fn load(&mut self, image: &[u8]) -> Result<(), CartridgeError> {
        Self::validate(image)?;
        self.data.fill(0);
        self.data[..image.len()].copy_from_slice(image);
        self.image_len = image.len();
        Ok(())
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.image_len = 0;
    }

    /// The full window, always `CART_CAPACITY` bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn image_len(&self) -> usize {
        self.image_len
    }

    pub fn is_loaded(&self) -> bool {
        self.image_len > 0
    }
}

impl Default for Cartridge {
    fn default() -> Self {
        Self::new()
    }
}
