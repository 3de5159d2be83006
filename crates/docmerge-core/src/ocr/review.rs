//! Operator review of images before recognition.

/// Image presented to the operator.
#[derive(Debug, Clone)]
pub struct ReviewImage<'a> {
    /// Cache key of the image
    pub checksum: u32,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Encoded image bytes (PNG, JPEG, ...)
    pub bytes: &'a [u8],
}

/// Operator's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Recognize the image
    Keep,
    /// Skip the image
    Ignore,
    /// Skip the image and stop asking for the rest of the run
    Exit,
}

impl ReviewDecision {
    /// Interpret a typed response: empty or `n` keeps the image, `exit`
    /// stops reviewing, anything else ignores it.
    pub fn from_response(response: &str) -> Self {
        let response = response.trim().to_lowercase();
        match response.as_str() {
            "" | "n" => Self::Keep,
            "exit" => Self::Exit,
            _ => Self::Ignore,
        }
    }
}

/// Asks a human whether an image is worth recognizing.
pub trait ImageReviewer: Send {
    fn review(&mut self, image: &ReviewImage<'_>) -> ReviewDecision;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response() {
        assert_eq!(ReviewDecision::from_response(""), ReviewDecision::Keep);
        assert_eq!(ReviewDecision::from_response("N\n"), ReviewDecision::Keep);
        assert_eq!(ReviewDecision::from_response("exit"), ReviewDecision::Exit);
        assert_eq!(ReviewDecision::from_response(" EXIT "), ReviewDecision::Exit);
        assert_eq!(ReviewDecision::from_response("y"), ReviewDecision::Ignore);
        assert_eq!(ReviewDecision::from_response("logo"), ReviewDecision::Ignore);
    }
}
