pub mod confidence_bar;
pub mod expert_card;
pub mod feedback_panel;
pub mod header;
pub mod loader;
pub mod product_card;
pub mod recommendation_list;
pub mod result_card;
pub mod upload_area;
