use crate::curvature::CurvatureError;
use crate::search::SearchError;

/// Errors returned by the lane detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LaneDetectError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Curvature(#[from] CurvatureError),
}
