pub mod google_places;
