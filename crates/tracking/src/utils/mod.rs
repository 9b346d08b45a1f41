pub mod centroid_table;
pub mod frame_files;
