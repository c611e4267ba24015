/*!
 * # Token Navigation
 *
 * The reading view is driven by one small state object, [`Navigator`],
 * holding:
 *
 * - the **flattened tokens** of the current snapshot: every valid token of
 *   every sentence, in sentence order then token order, each tagged with
 *   its position in that sequence;
 * - a **cursor** `(focused_index, reveal)`: which token has focus and which
 *   layer (original, transliteration, part of speech, translation) it
 *   shows;
 * - the **direction** of the text, which mirrors left/right movement.
 *
 * The flattened view is derived. It is rebuilt from scratch by
 * [`Navigator::sync`] whenever a new snapshot arrives, and the focus is
 * clamped into the new range.
 *
 * ## Commands
 *
 * Input devices map onto the [`Command`] set and [`Navigator::apply`]
 * dispatches them:
 *
 * ```rust
 * use glossa_engine::model::{RevealLayer, Sentence, Token};
 * use glossa_engine::navigation::{Command, Navigator};
 *
 * let sentence = Sentence::from_tokens([
 *     Token::new("casa").with_translation("house"),
 *     Token::new("grande"),
 * ]);
 * let mut nav = Navigator::new();
 * nav.sync(&[Some(sentence)]);
 *
 * // Transliteration and part of speech are empty, so the cycle lands on
 * // the translation.
 * nav.apply(Command::cycle_forward());
 * assert_eq!(nav.reveal_state(), RevealLayer::Translation);
 *
 * // Moving resets the layer.
 * nav.apply(Command::move_forward());
 * assert_eq!(nav.focused_index(), 1);
 * assert_eq!(nav.reveal_state(), RevealLayer::Original);
 * ```
 */

pub mod commands;
pub mod flatten;
pub mod navigator;

pub use commands::{Command, Step};
pub use flatten::{FlatToken, flatten, sentence_groups};
pub use navigator::{NavigationCursor, Navigator};
