pub mod seek_bar;
pub mod selectable_list;
pub mod util;
