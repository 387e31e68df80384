pub mod explodes;
pub mod subparser;

pub use explodes::explode;
pub use subparser::{
    collect_links, convert_links_to_proxies, parse_group_input, parse_subscription,
    read_subscription_input, Fetch, HttpFetcher,
};
