mod run;
mod show;
