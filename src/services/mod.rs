pub mod acceptance_service;
pub mod earnings_service;
pub mod notification_service;
pub mod offer_service;
pub mod trip_service;
pub mod trust_service;

#[cfg(test)]
pub(crate) mod test_fixtures;
