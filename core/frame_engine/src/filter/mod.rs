pub mod framerange;
