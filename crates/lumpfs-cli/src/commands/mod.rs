mod extract;
mod find;
mod folder;
mod hashes;
mod list;

pub use extract::{extract_lump, ExtractLumpArgs};
pub use find::{find_lump, FindLumpArgs};
pub use folder::{query_folder, QueryFolderArgs};
pub use hashes::{write_hashes, HashesArgs};
pub use list::{list_lumps, ListLumpsArgs};
