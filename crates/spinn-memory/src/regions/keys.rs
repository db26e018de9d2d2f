// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use spinn_keyspace::Keyspace;
use spinn_structures::Slice;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::error::{MemoryError, MemoryResult};
use crate::region::{Region, Subregion};

/// Extra word written after each key, computed from the key's keyspace and
/// the split vertex index
pub type KeyFieldFn = Arc<dyn Fn(&Keyspace, usize) -> MemoryResult<u64> + Send + Sync>;

/// A table of routing keys.
///
/// Each entry is the key itself followed by any extra fields. When
/// partitioned, one entry is written per atom of the slice instead of one
/// per keyspace.
#[derive(Clone)]
pub struct KeysRegion {
    keys: Vec<Keyspace>,
    fill_in_field: Option<String>,
    extra_fields: Vec<KeyFieldFn>,
    partitioned: bool,
    prepend_n_keys: bool,
    in_dtcm: bool,
}

impl KeysRegion {
    pub fn new(keys: Vec<Keyspace>) -> Self {
        KeysRegion {
            keys,
            fill_in_field: None,
            extra_fields: Vec::new(),
            partitioned: false,
            prepend_n_keys: false,
            in_dtcm: true,
        }
    }

    /// Bind `field` to the split vertex index before rendering each key
    pub fn with_fill_in_field(mut self, field: impl Into<String>) -> Self {
        self.fill_in_field = Some(field.into());
        self
    }

    pub fn with_extra_field(mut self, field: KeyFieldFn) -> Self {
        self.extra_fields.push(field);
        self
    }

    /// Follow each key with the mask of all its fields
    pub fn with_mask(self) -> Self {
        self.with_extra_field(Arc::new(|keyspace: &Keyspace, _: usize| -> MemoryResult<u64> {
            Ok(keyspace.get_mask(None)?)
        }))
    }

    pub fn partitioned(mut self) -> Self {
        self.partitioned = true;
        self
    }

    pub fn with_prepend_n_keys(mut self) -> Self {
        self.prepend_n_keys = true;
        self
    }

    pub fn in_sdram(mut self) -> Self {
        self.in_dtcm = false;
        self
    }

    fn keys_for(&self, slice: Slice) -> &[Keyspace] {
        if self.partitioned {
            let stop = slice.stop().min(self.keys.len());
            &self.keys[slice.start().min(stop)..stop]
        } else {
            &self.keys
        }
    }

    fn key_word(keyspace: &Keyspace, key: u64) -> MemoryResult<u32> {
        u32::try_from(key).map_err(|_| MemoryError::KeyTooWide {
            key,
            keyspace: keyspace.to_string(),
        })
    }
}

impl Region for KeysRegion {
    fn sizeof(&self, slice: Slice) -> usize {
        self.keys_for(slice).len() * (1 + self.extra_fields.len()) + usize::from(self.prepend_n_keys)
    }

    fn create_subregion(&self, slice: Slice, subvertex_index: usize) -> MemoryResult<Subregion> {
        let keys = self.keys_for(slice);
        let mut words = Vec::with_capacity(self.sizeof(slice));
        if self.prepend_n_keys {
            words.push(keys.len() as u32);
        }

        for keyspace in keys {
            let key = match &self.fill_in_field {
                Some(field) => keyspace
                    .bind([(field.as_str(), subvertex_index as u64)])?
                    .get_key(None)?,
                None => keyspace.get_key(None)?,
            };
            words.push(Self::key_word(keyspace, key)?);
            for field in &self.extra_fields {
                words.push(Self::key_word(keyspace, field(keyspace, subvertex_index)?)?);
            }
        }
        Ok(Subregion::from_words(&words))
    }

    fn in_dtcm(&self) -> bool {
        self.in_dtcm
    }
}

impl Debug for KeysRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeysRegion")
            .field("keys", &self.keys)
            .field("fill_in_field", &self.fill_in_field)
            .field("extra_fields", &self.extra_fields.len())
            .field("partitioned", &self.partitioned)
            .field("prepend_n_keys", &self.prepend_n_keys)
            .finish()
    }
}
