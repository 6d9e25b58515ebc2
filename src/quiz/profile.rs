//! Display profile for each of the six type labels.

use super::questions::Category;
use super::scoring::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeProfile {
    pub title: &'static str,
    pub subtitle: &'static str,
}

impl TypeProfile {
    pub fn for_classification(classification: Classification) -> Self {
        use Category::*;
        let (title, subtitle) = match classification {
            Classification::Pure(Fire) => ("開拓の騎士", "THE LEADER"),
            Classification::Pure(Water) => ("叡智の賢者", "THE ENGINEER"),
            Classification::Pure(Wind) => ("調和の精霊", "THE HEALER"),
            Classification::Blend(Fire, Water) | Classification::Blend(Water, Fire) => ("蒼炎の軍師", "THE STRATEGIST"),
            Classification::Blend(Fire, Wind) | Classification::Blend(Wind, Fire) => ("陽光の詩人", "THE ARTIST"),
            Classification::Blend(Water, Wind) | Classification::Blend(Wind, Water) => ("星詠みの司書", "THE GUIDE"),
            // a blend of one category with itself never comes out of classify
            Classification::Blend(c, _) => return Self::for_classification(Classification::Pure(c)),
        };
        Self { title, subtitle }
    }
}
