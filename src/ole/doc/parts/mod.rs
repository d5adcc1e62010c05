/// Readers for the binary structures of legacy Word documents:
/// - FIB (File Information Block)
/// - piece table
/// - character and paragraph bin tables with their FKP pages
/// - section, style, font and list tables, and the DOP
pub mod bin_data;
pub mod bin_table;
pub mod chp;
pub mod dop;
pub mod fib;
pub mod fkp;
pub mod font_table;
pub mod list_tables;
pub mod pap;
pub mod piece_table;
pub mod property_engine;
pub mod section_table;
pub mod stylesheet;
