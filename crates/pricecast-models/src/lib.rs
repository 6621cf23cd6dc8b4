pub mod family;
pub mod forest;
pub mod knn;
pub mod lasso;
pub mod svr;
pub mod tree;

pub use family::{fit, Family, FittedModel, Params, Regressor};
pub use forest::RandomForest;
pub use knn::KnnRegressor;
pub use lasso::Lasso;
pub use svr::Svr;
pub use tree::DecisionTree;
