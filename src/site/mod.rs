mod base_url;
mod robots;
mod sitemap;

pub(crate) use base_url::{resolve_base_url, BaseUrl};
pub(crate) use robots::Robots;
pub(crate) use sitemap::{build_sitemap, discover_pages, with_extra_pages};
