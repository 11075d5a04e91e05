mod client;

pub use client::{
    Candidate, CandidateContent, CandidatePart, DEFAULT_BASE_URL, GeminiClient,
    GenerateContentResponse, UsageMetadata,
};
