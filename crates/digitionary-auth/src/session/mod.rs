/*
[INPUT]:  User-triggered sign-in and logout actions
[OUTPUT]: Login screen state and wallet session snapshots
[POS]:    Session layer - UI-facing controller and state machine
[UPDATE]: When login states or controller operations change
*/

pub mod controller;
pub mod state;

pub use controller::{LoginController, SsoHandoff};
pub use state::{AuthAction, AuthState, StateError, WalletSession};
