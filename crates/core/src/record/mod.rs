mod error;
mod operations;
mod types;
mod validation;

pub use error::{FieldErrors, RequestError, ValidationDetails};
pub use operations::{
    find_first, merge_upsert_record, merge_upsert_records, remove_by_ids, upsert_record,
    UpsertOutcome,
};
pub use types::{DecodedPlantList, PlantList, Record, RecordId, ENVELOPE_KEY, ID_FIELD};
pub use validation::{
    parse_delete_ids, parse_garden_updates, parse_new_garden_items, parse_plant, parse_plants,
};
