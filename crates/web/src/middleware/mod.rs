pub mod see_other;
