use crate::auction::{Lot, LotId, LotIdRef};
use std::collections::BTreeMap;
use tracing::warn;

/// The lots on sale, in listing order, with their images
///
/// Built once per session and never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct CatalogStore {
    order: Vec<LotId>,
    images: BTreeMap<LotId, Option<String>>,
}

impl CatalogStore {
    pub fn from_listing(listing: impl IntoIterator<Item = Lot>) -> Self {
        let mut catalog = Self::default();

        for Lot { id, image } in listing {
            if id.is_empty() {
                continue;
            }
            if catalog.images.insert(id.clone(), image).is_some() {
                warn!(lot = %id, "lot listed more than once, keeping the last image");
            } else {
                catalog.order.push(id);
            }
        }

        catalog
    }

    pub fn lots(&self) -> &[LotId] {
        &self.order
    }

    pub fn contains(&self, lot: LotIdRef) -> bool {
        self.images.contains_key(lot)
    }

    pub fn image(&self, lot: LotIdRef) -> Option<&str> {
        self.images.get(lot).and_then(|image| image.as_deref())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
