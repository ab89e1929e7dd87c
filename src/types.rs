/// Unidentified-remains case number (unique within the UHR collection).
/// Example: `UP12345`
pub type CaseNumber = String;
/// Missing-person file number (unique within the MP collection).
/// Example: `MP67890`
pub type FileNumber = String;
/// Normalized lowercase description token.
/// Examples: `hoodie`, `scar`, `nike`
pub type Token = String;
/// Human-readable explanation attached to a lead.
/// Examples: `hoodie (rare)`, `scar`, `12 miles away`
pub type Feature = String;
/// Identifier for the store a record set was loaded from.
/// Examples: `memory`, `json:data/filament`
pub type StoreId = String;
