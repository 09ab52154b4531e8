use std::collections::HashMap;

use log::debug;

use super::info::ParameterInfo;
use crate::error::{Error, Result};

/// Dense index of a registered parameter.
///
/// Resolved once on the control thread; the real-time side only ever sees
/// indices, never string ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamIndex(u32);

impl ParamIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Fixed table of parameter descriptors, filled before the engine is built.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    infos: Vec<ParameterInfo>,
    by_id: HashMap<String, ParamIndex>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a descriptor, returning its index.
    pub fn register(&mut self, info: ParameterInfo) -> Result<ParamIndex> {
        info.validate()?;
        if self.by_id.contains_key(&info.id) {
            return Err(Error::DuplicateParameter(info.id));
        }

        let index = u32::try_from(self.infos.len())
            .map(ParamIndex)
            .map_err(|_| Error::InvalidConfig("too many parameters"))?;

        debug!(
            "registered parameter `{}` at index {} [{}, {}] default {}",
            info.id,
            index.get(),
            info.min_value,
            info.max_value,
            info.default_value
        );
        self.by_id.insert(info.id.clone(), index);
        self.infos.push(info);
        Ok(index)
    }

    pub fn index_of(&self, id: &str) -> Option<ParamIndex> {
        self.by_id.get(id).copied()
    }

    /// Like [`index_of`](Self::index_of) but reports unknown ids as errors.
    pub fn resolve(&self, id: &str) -> Result<ParamIndex> {
        self.index_of(id)
            .ok_or_else(|| Error::UnknownParameter(id.to_string()))
    }

    pub fn info(&self, index: ParamIndex) -> Option<&ParameterInfo> {
        self.infos.get(index.get())
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamIndex, &ParameterInfo)> {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (ParamIndex(i as u32), info))
    }
}
