mod controls;
mod status;
