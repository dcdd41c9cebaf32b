pub mod financial_input;
pub mod user;

pub use financial_input::{
    CalculatedResult, FinancialInput, FinancialInputRow, FinancialInputWithOwner, InputData,
    NewFinancialInput, OwnerSummary, RecordPatch,
};
pub use user::{NewUser, ProfilePatch, PublicUser, User, UserRow};
