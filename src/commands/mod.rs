pub mod add_toc;
pub mod headings;
pub mod run;
pub mod toc;
