pub mod config;
pub mod crop;
pub mod generation;
pub mod history;
pub mod import;
pub mod input;
pub mod interaction;
pub mod shortcuts;
pub mod studio;

pub use config::{GenerationConfig, StudioConfig};
pub use crop::CropSession;
pub use generation::{
    GeneratedImage, GenerationClient, GenerationError, GenerationRequest, GenerationResponse,
    GenerationState, HttpGenerationClient, Quality,
};
pub use history::{History, HistoryEntry};
pub use import::{ImportError, ImportedImage, LayerSeed};
pub use input::{InputEvent, KeyEvent, Modifiers, PointerTarget};
pub use interaction::{Gesture, GestureOutcome, InteractionController};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use studio::{AlignReference, Studio};
