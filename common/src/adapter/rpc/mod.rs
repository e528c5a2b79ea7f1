pub mod py_celery;
