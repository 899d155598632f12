// src/stores/master_data_store.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stores::{NoFilter, Resource, Store};

/// Body for creating or renaming a lookup entry.
#[derive(Debug, Clone, Serialize)]
pub struct LookupDraft {
    pub name: String,
}

// Master data are plain `{ id, name }` lists that differ only by endpoint.
macro_rules! lookup_resource {
    ($ty:ident, $store:ident, $path:literal, $label:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $ty {
            pub id: Uuid,
            pub name: String,
        }

        impl Resource for $ty {
            const PATH: &'static str = $path;
            const LABEL: &'static str = $label;
            type Draft = LookupDraft;
            type Patch = LookupDraft;
            type Filter = NoFilter;

            fn id(&self) -> Uuid {
                self.id
            }
        }

        pub type $store = Store<$ty>;
    };
}

lookup_resource!(District, DistrictStore, "/master/districts", "district");
lookup_resource!(Gender, GenderStore, "/master/genders", "gender");
lookup_resource!(DocumentType, DocumentTypeStore, "/master/document_types", "document type");
lookup_resource!(JobTitle, JobTitleStore, "/master/job_titles", "job title");
