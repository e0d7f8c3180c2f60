//! Fortune draws for the future-predictor screen.

use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_FORTUNE_COUNT: usize = 3;

pub const FUTURE_OUTCOMES: [&str; 20] = [
    "You will invent a new color that only you can see.",
    "A stray cat will lead you to a hidden treasure.",
    "You will accidentally become the mayor of a small town.",
    "Your left shoe will always be slightly tighter than your right.",
    "You will discover a new species of deep-sea creature in your bathtub.",
    "Aliens will contact you, but only to ask for WiFi passwords.",
    "You will win a lottery, but the prize is 10,000 rubber ducks.",
    "A time traveler will ask you for directions to the nearest coffee shop.",
    "You will become famous for a dance move you did while sneezing.",
    "Your plants will start whispering secrets to you.",
    "You will find a key that opens every door, but locks none.",
    "A cloud will follow you around, raining only on your enemies.",
    "You will write a bestseller without typing a single word.",
    "Your reflection will start giving you fashion advice.",
    "You will be the first person to high-five a ghost.",
    "A squirrel will challenge you to a game of chess and win.",
    "You will discover that you can speak fluent Dolphin.",
    "Your shadow will detach and start its own career.",
    "You will bake a cake so delicious it brings world peace.",
    "You will accidentally join a secret society of mimes.",
];

/// Draw up to `count` distinct fortunes in random order.
pub fn draw_fortunes<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<&'static str> {
    FUTURE_OUTCOMES
        .choose_multiple(rng, count.min(FUTURE_OUTCOMES.len()))
        .copied()
        .collect()
}
