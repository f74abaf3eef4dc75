#![allow(dead_code)]

use std::sync::Arc;

use roomly_data::Entity;
use roomly_http::ApiCall;
use roomly_store::{ListQuery, PagedList, Resource};
use roomly_test::MockBackend;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
}

impl Entity for Listing {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewListing {
    pub title: String,
}

pub struct Listings;

impl Resource for Listings {
    type Item = Listing;
    type Filters = ListingFilters;
    type Create = NewListing;
    type Update = NewListing;

    const NAME: &'static str = "listings";
    const PATH: &'static str = "/listings";
}

pub fn listing(id: &str, title: &str) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
    }
}

pub fn paged_list(backend: &MockBackend) -> PagedList<Listing, ListingFilters> {
    let api: Arc<dyn ApiCall> = Arc::new(backend.clone());
    PagedList::new(api, "/listings")
}

pub fn city(name: &str) -> ListQuery<ListingFilters> {
    ListQuery::new(
        ListingFilters {
            city: Some(name.to_string()),
        },
        20,
    )
}

pub fn ids(items: &[Listing]) -> Vec<&str> {
    items.iter().map(|l| l.id.as_str()).collect()
}
